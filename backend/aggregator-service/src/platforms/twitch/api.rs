use reqwest::RequestBuilder;
use tracing::{debug, warn};

use super::normalize::{Page, TwitchStream, TwitchUser};
use crate::models::Platform;
use crate::platforms::{read_json, transport, PlatformResult};

/// Helix caps `id`/`login` filters and page size at 100.
const HELIX_BATCH: usize = 100;

/// Safety bound on `streams/followed` pagination.
const MAX_FOLLOWED_PAGES: usize = 5;

/// Twitch Helix REST client.
#[derive(Clone)]
pub struct TwitchApi {
    http: reqwest::Client,
    api_base: String,
    client_id: String,
}

impl TwitchApi {
    pub fn new(http: reqwest::Client, api_base: &str, client_id: &str) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
        }
    }

    fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{}", self.api_base, path))
            .header("Client-ID", &self.client_id)
            .bearer_auth(token)
    }

    /// Most-watched live streams.
    pub async fn top_streams(&self, token: &str, first: u32) -> PlatformResult<Vec<TwitchStream>> {
        let response = self
            .get("/streams", token)
            .query(&[("first", first.to_string())])
            .send()
            .await
            .map_err(transport(Platform::Twitch))?;
        let page: Page<TwitchStream> = read_json(Platform::Twitch, response).await?;
        Ok(page.data)
    }

    /// Live streams of channels `user_id` follows.
    pub async fn followed_streams(
        &self,
        token: &str,
        user_id: &str,
    ) -> PlatformResult<Vec<TwitchStream>> {
        let mut streams = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_FOLLOWED_PAGES {
            let mut query = vec![
                ("user_id", user_id.to_string()),
                ("first", HELIX_BATCH.to_string()),
            ];
            if let Some(after) = cursor.take() {
                query.push(("after", after));
            }

            let response = self
                .get("/streams/followed", token)
                .query(&query)
                .send()
                .await
                .map_err(transport(Platform::Twitch))?;
            let page: Page<TwitchStream> = read_json(Platform::Twitch, response).await?;
            streams.extend(page.data);

            cursor = page.pagination.and_then(|p| p.cursor).filter(|c| !c.is_empty());
            if cursor.is_none() {
                break;
            }
        }
        if cursor.is_some() {
            warn!(
                user_id = %user_id,
                pages = MAX_FOLLOWED_PAGES,
                count = streams.len(),
                "Followed streams pagination capped, remaining pages skipped"
            );
        }

        debug!(user_id = %user_id, count = streams.len(), "Fetched Twitch followed streams");
        Ok(streams)
    }

    /// Batched `users?id=` lookup.
    pub async fn users_by_id(&self, token: &str, ids: &[String]) -> PlatformResult<Vec<TwitchUser>> {
        let mut users = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(HELIX_BATCH) {
            let query: Vec<(&str, &str)> = chunk.iter().map(|id| ("id", id.as_str())).collect();
            let response = self
                .get("/users", token)
                .query(&query)
                .send()
                .await
                .map_err(transport(Platform::Twitch))?;
            let page: Page<TwitchUser> = read_json(Platform::Twitch, response).await?;
            users.extend(page.data);
        }
        Ok(users)
    }

    /// Exact login match, used by search.
    pub async fn user_by_login(&self, token: &str, login: &str) -> PlatformResult<Option<TwitchUser>> {
        let response = self
            .get("/users", token)
            .query(&[("login", login)])
            .send()
            .await
            .map_err(transport(Platform::Twitch))?;
        let page: Page<TwitchUser> = read_json(Platform::Twitch, response).await?;
        Ok(page.data.into_iter().next())
    }

    /// The user owning `token`.
    pub async fn current_user(&self, token: &str) -> PlatformResult<Option<TwitchUser>> {
        let response = self
            .get("/users", token)
            .send()
            .await
            .map_err(transport(Platform::Twitch))?;
        let page: Page<TwitchUser> = read_json(Platform::Twitch, response).await?;
        Ok(page.data.into_iter().next())
    }
}
