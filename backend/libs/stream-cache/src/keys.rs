//! Cache key schema
//!
//! Keys are namespaced `<platform>:<scope>:<id>`. The first segment doubles as
//! the metrics label, so every builder here must keep it stable.

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    // ============= Public data =============

    /// Format: twitch:public:top_streams
    pub fn twitch_top_streams() -> String {
        "twitch:public:top_streams".to_string()
    }

    /// Format: kick:public:top_streams
    pub fn kick_top_streams() -> String {
        "kick:public:top_streams".to_string()
    }

    /// Format: google:public:top_streams
    pub fn youtube_top_streams() -> String {
        "google:public:top_streams".to_string()
    }

    /// Composite key for all three platforms' search results.
    /// Format: search:all:{lowercased query}
    pub fn search(query: &str) -> String {
        format!("search:all:{}", query.trim().to_lowercase())
    }

    // ============= Per-user data =============

    /// Format: twitch:following:{twitch_user_id}
    pub fn twitch_following(user_id: &str) -> String {
        format!("twitch:following:{}", user_id)
    }

    /// Format: youtube:following:{channel_id}
    pub fn youtube_following(channel_id: &str) -> String {
        format!("youtube:following:{}", channel_id)
    }

    // ============= Auth =============

    /// Server-wide client-credentials token.
    /// Format: {platform}:app_token
    pub fn app_token(platform: &str) -> String {
        format!("{}:app_token", platform)
    }

    /// Format: oauth:state:{token}
    pub fn oauth_state(token: &str) -> String {
        format!("oauth:state:{}", token)
    }

    /// Format: session:{session_id}:{platform}
    pub fn session(session_id: &str, platform: &str) -> String {
        format!("session:{}:{}", session_id, platform)
    }

    /// Pattern for every platform entry of one session
    pub fn session_pattern(session_id: &str) -> String {
        format!("session:{}:*", session_id)
    }
}

/// Namespace of a key, used as the metrics label.
pub(crate) fn namespace(key: &str) -> &str {
    key.split(':').next().filter(|s| !s.is_empty()).unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_key_is_case_insensitive() {
        assert_eq!(CacheKey::search("  xQc "), "search:all:xqc");
        assert_eq!(CacheKey::search("XQC"), CacheKey::search("xqc"));
    }

    #[test]
    fn keys_are_platform_namespaced() {
        assert_eq!(CacheKey::twitch_following("42"), "twitch:following:42");
        assert_eq!(CacheKey::youtube_following("UC1"), "youtube:following:UC1");
        assert_eq!(CacheKey::session("abc", "kick"), "session:abc:kick");
        assert_eq!(namespace(&CacheKey::youtube_top_streams()), "google");
        assert_eq!(namespace(""), "unknown");
    }
}
