pub mod api;
pub mod normalize;

pub use api::TwitchApi;
pub use normalize::{
    standardize_twitch_follow, standardize_twitch_search, standardize_twitch_stream, TwitchStream,
    TwitchUser,
};
