pub mod credential;
pub mod platform;
pub mod search;
pub mod status;
pub mod stream;

pub use credential::{Credential, PlatformProfile, PlatformSession, TokenResponse};
pub use platform::Platform;
pub use search::{SearchResults, StreamerSearchResult};
pub use status::{LoginStatus, LoginStatusResponse, PublicAccess, PublicAccessResponse};
pub use stream::{FollowedStreamer, Stream, TopStreams};
