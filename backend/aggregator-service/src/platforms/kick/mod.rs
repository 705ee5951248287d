pub mod api;
pub mod normalize;

pub use api::KickApi;
pub use normalize::{
    standardize_kick_search, standardize_kick_stream, KickChannel, KickLivestream, KickUser,
};
