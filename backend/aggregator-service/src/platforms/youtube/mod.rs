pub mod api;
pub mod live_probe;
pub mod normalize;

pub use api::{YoutubeApi, YoutubeAuth};
pub use normalize::{
    standardize_youtube_follow, standardize_youtube_search, standardize_youtube_stream,
    YoutubeChannel, YoutubeVideo,
};
