pub mod auth;
pub mod debug;
pub mod health;
pub mod public;
pub mod status;
pub mod user;
