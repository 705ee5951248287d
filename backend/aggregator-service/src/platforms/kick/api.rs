use reqwest::RequestBuilder;
use serde::Deserialize;

use super::normalize::{Envelope, KickChannel, KickLivestream, KickUser};
use crate::models::Platform;
use crate::platforms::{read_json, transport, PlatformResult};

/// Kick public API client (`api.kick.com/public/v1`).
#[derive(Clone)]
pub struct KickApi {
    http: reqwest::Client,
    api_base: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Introspection {
    active: bool,
}

#[derive(Debug, Deserialize)]
struct IntrospectionEnvelope {
    #[serde(default)]
    data: Introspection,
}

impl KickApi {
    pub fn new(http: reqwest::Client, api_base: &str) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{}", self.api_base, path))
            .header("Accept", "*/*")
            .bearer_auth(token)
    }

    async fn list<T: serde::de::DeserializeOwned>(&self, request: RequestBuilder) -> PlatformResult<Vec<T>> {
        let response = request.send().await.map_err(transport(Platform::Kick))?;
        let envelope: Envelope<T> = read_json(Platform::Kick, response).await?;
        Ok(envelope.data)
    }

    pub async fn livestreams(&self, token: &str) -> PlatformResult<Vec<KickLivestream>> {
        self.list(self.get("/livestreams", token)).await
    }

    /// Repeated `id=` lookup; empty input skips the call.
    pub async fn users(&self, token: &str, ids: &[String]) -> PlatformResult<Vec<KickUser>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query: Vec<(&str, &str)> = ids.iter().map(|id| ("id", id.as_str())).collect();
        self.list(self.get("/users", token).query(&query)).await
    }

    /// The user owning `token`.
    pub async fn current_user(&self, token: &str) -> PlatformResult<Option<KickUser>> {
        Ok(self.list(self.get("/users", token)).await?.into_iter().next())
    }

    pub async fn channel_by_slug(&self, token: &str, slug: &str) -> PlatformResult<Option<KickChannel>> {
        let request = self.get("/channels", token).query(&[("slug", slug)]);
        Ok(self.list(request).await?.into_iter().next())
    }

    /// `POST /token/introspect`; a 401 means the token is dead.
    pub async fn introspect(&self, token: &str) -> PlatformResult<bool> {
        let response = self
            .http
            .post(format!("{}/token/introspect", self.api_base))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport(Platform::Kick))?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(false);
        }
        let envelope: IntrospectionEnvelope = read_json(Platform::Kick, response).await?;
        Ok(envelope.data.active)
    }
}
