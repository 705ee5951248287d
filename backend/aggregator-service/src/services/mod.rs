pub mod credentials;
pub mod following;
pub mod oauth;
pub mod search;
pub mod top_streams;

pub use credentials::CredentialService;
pub use following::FollowingService;
pub use search::SearchService;
pub use top_streams::TopStreamsService;
