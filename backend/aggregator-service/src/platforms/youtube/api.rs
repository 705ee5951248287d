use futures::future::join_all;
use reqwest::RequestBuilder;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::live_probe::{canonical_url, live_video_id};
use super::normalize::{
    standardize_youtube_follow, ListResponse, SearchItem, Subscription, YoutubeChannel,
    YoutubeVideo,
};
use crate::models::{FollowedStreamer, Platform};
use crate::platforms::{read_json, transport, PlatformError, PlatformResult};

/// Data API `id` filters and `maxResults` cap at 50.
const DATA_API_BATCH: usize = 50;

/// Safety bound on subscription pagination.
const MAX_SUBSCRIPTION_PAGES: usize = 40;

/// How a Data API call is authorized.
#[derive(Debug, Clone, Copy)]
pub enum YoutubeAuth<'a> {
    ApiKey,
    Bearer(&'a str),
}

/// YouTube Data API v3 client plus the channel-page live probe.
#[derive(Clone)]
pub struct YoutubeApi {
    http: reqwest::Client,
    probe_http: reqwest::Client,
    api_base: String,
    web_base: String,
    api_key: String,
    probe_timeout: Duration,
}

impl YoutubeApi {
    pub fn new(
        http: reqwest::Client,
        probe_http: reqwest::Client,
        api_base: &str,
        web_base: &str,
        api_key: &str,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            http,
            probe_http,
            api_base: api_base.trim_end_matches('/').to_string(),
            web_base: web_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            probe_timeout,
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn get(&self, path: &str, auth: YoutubeAuth<'_>) -> PlatformResult<RequestBuilder> {
        let request = self.http.get(format!("{}{}", self.api_base, path));
        match auth {
            YoutubeAuth::Bearer(token) => Ok(request.bearer_auth(token)),
            YoutubeAuth::ApiKey if self.has_api_key() => {
                Ok(request.query(&[("key", self.api_key.as_str())]))
            }
            YoutubeAuth::ApiKey => Err(PlatformError::NotConfigured {
                platform: Platform::Youtube,
                message: "GOOGLE_API_KEY is empty".to_string(),
            }),
        }
    }

    async fn list<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> PlatformResult<ListResponse<T>> {
        let response = request
            .send()
            .await
            .map_err(transport(Platform::Youtube))?;
        read_json(Platform::Youtube, response).await
    }

    /// Live videos ordered by viewers.
    pub async fn live_search(&self, max_results: u32) -> PlatformResult<Vec<SearchItem>> {
        let max_results = max_results.to_string();
        let request = self.get("/search", YoutubeAuth::ApiKey)?.query(&[
            ("part", "snippet"),
            ("eventType", "live"),
            ("maxResults", max_results.as_str()),
            ("type", "video"),
            ("order", "viewCount"),
        ]);
        Ok(self.list(request).await?.items)
    }

    pub async fn videos(
        &self,
        ids: &[String],
        auth: YoutubeAuth<'_>,
    ) -> PlatformResult<Vec<YoutubeVideo>> {
        let mut videos = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(DATA_API_BATCH) {
            let ids = chunk.join(",");
            let request = self.get("/videos", auth)?.query(&[
                ("part", "snippet,liveStreamingDetails"),
                ("id", ids.as_str()),
            ]);
            videos.extend(self.list::<YoutubeVideo>(request).await?.items);
        }
        Ok(videos)
    }

    pub async fn channels(
        &self,
        ids: &[String],
        auth: YoutubeAuth<'_>,
    ) -> PlatformResult<Vec<YoutubeChannel>> {
        let mut channels = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(DATA_API_BATCH) {
            let ids = chunk.join(",");
            let request = self
                .get("/channels", auth)?
                .query(&[("part", "snippet"), ("id", ids.as_str())]);
            channels.extend(self.list::<YoutubeChannel>(request).await?.items);
        }
        Ok(channels)
    }

    /// The channel owned by the signed-in user.
    pub async fn my_channel(&self, token: &str) -> PlatformResult<Option<YoutubeChannel>> {
        let request = self
            .get("/channels", YoutubeAuth::Bearer(token))?
            .query(&[("part", "id,snippet"), ("mine", "true")]);
        Ok(self.list::<YoutubeChannel>(request).await?.items.into_iter().next())
    }

    /// Exact `@handle` lookup, used by search.
    pub async fn channel_by_handle(&self, handle: &str) -> PlatformResult<Option<YoutubeChannel>> {
        let request = self.get("/channels", YoutubeAuth::ApiKey)?.query(&[
            ("forHandle", handle),
            ("part", "id,snippet"),
            ("maxResults", "10"),
        ]);
        Ok(self.list::<YoutubeChannel>(request).await?.items.into_iter().next())
    }

    /// Every subscription of the signed-in user, following `nextPageToken`.
    pub async fn subscriptions(&self, token: &str) -> PlatformResult<Vec<Subscription>> {
        let mut subscriptions = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_SUBSCRIPTION_PAGES {
            let mut request = self.get("/subscriptions", YoutubeAuth::Bearer(token))?.query(&[
                ("part", "snippet"),
                ("mine", "true"),
                ("maxResults", "50"),
                ("order", "alphabetical"),
            ]);
            if let Some(page) = page_token.take() {
                request = request.query(&[("pageToken", page)]);
            }

            let page: ListResponse<Subscription> = self.list(request).await?;
            subscriptions.extend(page.items);

            page_token = page.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                break;
            }
        }
        if page_token.is_some() {
            warn!(
                pages = MAX_SUBSCRIPTION_PAGES,
                count = subscriptions.len(),
                "Subscription pagination capped, remaining pages skipped"
            );
        }

        debug!(count = subscriptions.len(), "Fetched YouTube subscriptions");
        Ok(subscriptions)
    }

    /// Video id of the channel's running broadcast, if any. Probe failures
    /// read as "not live".
    pub async fn probe_live(&self, channel_id: &str) -> Option<String> {
        let url = format!("{}/channel/{}/live", self.web_base, channel_id);
        let response = match self
            .probe_http
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!(channel_id = %channel_id, status = response.status().as_u16(), "Live probe rejected");
                return None;
            }
            Err(e) => {
                debug!(channel_id = %channel_id, error = %e, "Live probe failed");
                return None;
            }
        };

        let html = response.text().await.ok()?;
        canonical_url(&html).and_then(|canonical| live_video_id(&canonical))
    }

    /// Subscribed channels that are live right now.
    ///
    /// Channel ids go out in batches of 50: every channel in a batch is probed
    /// concurrently, then one `videos` call resolves the live candidates and a
    /// `channels` call supplies handles and avatars.
    pub async fn live_subscriptions(&self, token: &str) -> PlatformResult<Vec<FollowedStreamer>> {
        let channel_ids: Vec<String> = self
            .subscriptions(token)
            .await?
            .iter()
            .filter_map(Subscription::channel_id)
            .map(str::to_string)
            .collect();

        let batches = channel_ids
            .chunks(DATA_API_BATCH)
            .map(|batch| self.live_batch(token, batch));
        let mut live = Vec::new();
        for result in join_all(batches).await {
            live.extend(result?);
        }

        info!(
            subscriptions = channel_ids.len(),
            live = live.len(),
            "Resolved live YouTube subscriptions"
        );
        Ok(live)
    }

    async fn live_batch(
        &self,
        token: &str,
        channel_ids: &[String],
    ) -> PlatformResult<Vec<FollowedStreamer>> {
        let probes = channel_ids.iter().map(|id| self.probe_live(id));
        let video_ids: Vec<String> = join_all(probes).await.into_iter().flatten().collect();
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let videos: Vec<YoutubeVideo> = self
            .videos(&video_ids, YoutubeAuth::Bearer(token))
            .await?
            .into_iter()
            .filter(YoutubeVideo::is_live)
            .collect();
        if videos.is_empty() {
            return Ok(Vec::new());
        }

        let live_channel_ids: Vec<String> = videos
            .iter()
            .filter_map(|v| v.channel_id().map(str::to_string))
            .collect();
        let channels: HashMap<String, YoutubeChannel> = self
            .channels(&live_channel_ids, YoutubeAuth::Bearer(token))
            .await?
            .into_iter()
            .filter_map(|c| c.id.clone().map(|id| (id, c)))
            .collect();

        Ok(videos
            .iter()
            .map(|video| {
                let channel = video.channel_id().and_then(|id| channels.get(id));
                standardize_youtube_follow(video, channel)
            })
            .collect())
    }
}
