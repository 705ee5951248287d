//! Shared application state
//!
//! Built once at startup and handed to every handler through `web::Data`.

use std::sync::Arc;
use std::time::Duration;

use stream_cache::StreamCache;

use crate::config::Config;
use crate::platforms::{http_client, PlatformClients};
use crate::services::oauth::{OAuthProviders, OAuthStateStore};
use crate::services::{CredentialService, FollowingService, SearchService, TopStreamsService};
use crate::session::{CacheCredentialRepository, CredentialRepository, SessionManager};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: StreamCache,
    pub sessions: SessionManager,
    pub oauth_states: OAuthStateStore,
    pub clients: PlatformClients,
    pub credentials: Arc<CredentialService>,
    pub following: Arc<FollowingService>,
    pub top_streams: Arc<TopStreamsService>,
    pub search: Arc<SearchService>,
}

impl AppState {
    pub fn new(config: Config, cache: StreamCache) -> Self {
        let http = http_client(Duration::from_secs(config.http.timeout_secs));
        let clients = PlatformClients::new(&config, http.clone());
        let providers = Arc::new(OAuthProviders::new(&config, http));

        let repository: Arc<dyn CredentialRepository> = Arc::new(CacheCredentialRepository::new(
            cache.clone(),
            config.app.session_ttl_secs,
        ));
        let credentials = Arc::new(CredentialService::new(repository, providers, cache.clone()));

        Self {
            sessions: SessionManager::new(
                &config.app.session_secret,
                config.app.session_ttl_secs,
                config.app.cookie_secure,
            ),
            oauth_states: OAuthStateStore::new(cache.clone()),
            following: Arc::new(FollowingService::new(credentials.clone(), clients.clone(), cache.clone())),
            top_streams: Arc::new(TopStreamsService::new(credentials.clone(), clients.clone(), cache.clone())),
            search: Arc::new(SearchService::new(credentials.clone(), clients.clone(), cache.clone())),
            credentials,
            clients,
            cache,
            config: Arc::new(config),
        }
    }
}
