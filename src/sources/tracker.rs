use crate::config::TrackerConfig;
use crate::error::app_error::AppError;
use crate::models::player::PlayerMatch;
use crate::models::session::{SessionFetch, SessionPage};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const TRACKER_SOURCE: &str = "session tracker";

/// High-level session source the service layer depends on.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Best search match for a display name, scoped to one server.
    async fn search_player(&self, name: &str, server_id: &str) -> Result<Option<PlayerMatch>, AppError>;

    /// Exhaustively fetch a player's sessions, optionally scoped to a server.
    /// A mid-pagination failure is not an error: the accumulated records are
    /// returned with `truncated` set.
    async fn fetch_sessions(&self, player_id: &str, server_id: Option<&str>) -> Result<SessionFetch, AppError>;
}

/// Low-level page access, split out so the drain loop can be exercised
/// against scripted pages.
#[async_trait]
pub trait SessionPages: Send + Sync {
    async fn first_page(&self, player_id: &str, server_id: Option<&str>) -> Result<SessionPage, AppError>;

    /// Fetch the page behind an opaque `links.next` reference.
    async fn page_at(&self, next_url: &str) -> Result<SessionPage, AppError>;
}

/// Follow the cursor chain until the source stops advertising a next page, a
/// request fails (partial results, `truncated`), or `max_pages` is reached.
pub async fn drain_pages<P>(pages: &P, player_id: &str, server_id: Option<&str>, max_pages: u32) -> SessionFetch
where
    P: SessionPages + ?Sized,
{
    let mut records = Vec::new();
    let mut fetched: u32 = 0;
    let mut next: Option<String> = None;

    loop {
        if fetched >= max_pages {
            warn!(player_id, max_pages, "page cap reached before the cursor chain ended, truncating");
            return SessionFetch { records, truncated: true };
        }

        let page = match &next {
            None => pages.first_page(player_id, server_id).await,
            Some(url) => pages.page_at(url).await,
        };

        match page {
            Ok(page) => {
                fetched += 1;
                records.extend(page.data);
                match page.links.next {
                    Some(url) => next = Some(url),
                    None => {
                        debug!(player_id, pages = fetched, records = records.len(), "session fetch drained");
                        return SessionFetch { records, truncated: false };
                    }
                }
            }
            Err(e) => {
                // A failed page means "no more data": whatever is accumulated
                // is returned, flagged as truncated.
                warn!(player_id, page = fetched + 1, error = %e, "session page failed, returning partial results");
                return SessionFetch { records, truncated: true };
            }
        }
    }
}

/// BattleMetrics-compatible client over the shared HTTP connection pool.
pub struct TrackerClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    page_size: u32,
    max_pages: u32,
}

impl TrackerClient {
    pub fn new(config: &TrackerConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::http(TRACKER_SOURCE, e))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            page_size: config.page_size,
            max_pages: config.max_pages,
        })
    }

    async fn get_page(&self, request: reqwest::RequestBuilder) -> Result<SessionPage, AppError> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| AppError::http(TRACKER_SOURCE, e))?;

        if !response.status().is_success() {
            return Err(AppError::unavailable(TRACKER_SOURCE, response.status().as_u16()));
        }

        response.json::<SessionPage>().await.map_err(|e| AppError::http(TRACKER_SOURCE, e))
    }
}

#[async_trait]
impl SessionPages for TrackerClient {
    async fn first_page(&self, player_id: &str, server_id: Option<&str>) -> Result<SessionPage, AppError> {
        let url = format!("{}/players/{}/relationships/sessions", self.base_url, player_id);
        let mut request = self.http.get(url).query(&[("page[size]", self.page_size.to_string())]);
        if let Some(server_id) = server_id {
            request = request.query(&[("filter[servers]", server_id)]);
        }

        self.get_page(request).await
    }

    async fn page_at(&self, next_url: &str) -> Result<SessionPage, AppError> {
        // The next reference is a complete URL carrying the cursor state.
        self.get_page(self.http.get(next_url)).await
    }
}

#[derive(Debug, Deserialize)]
struct PlayerSearchPage {
    #[serde(default)]
    data: Vec<PlayerSearchRecord>,
}

#[derive(Debug, Deserialize)]
struct PlayerSearchRecord {
    id: String,
    #[serde(default)]
    attributes: PlayerSearchAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct PlayerSearchAttributes {
    name: Option<String>,
}

#[async_trait]
impl SessionSource for TrackerClient {
    async fn search_player(&self, name: &str, server_id: &str) -> Result<Option<PlayerMatch>, AppError> {
        let url = format!("{}/players", self.base_url);
        let response = self
            .http
            .get(url)
            .query(&[("filter[search]", name), ("filter[servers]", server_id)])
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| AppError::http(TRACKER_SOURCE, e))?;

        if !response.status().is_success() {
            return Err(AppError::unavailable(TRACKER_SOURCE, response.status().as_u16()));
        }

        let page = response.json::<PlayerSearchPage>().await.map_err(|e| AppError::http(TRACKER_SOURCE, e))?;

        Ok(page.data.into_iter().next().map(|record| PlayerMatch {
            name: record.attributes.name.unwrap_or_else(|| name.to_string()),
            id: record.id,
        }))
    }

    async fn fetch_sessions(&self, player_id: &str, server_id: Option<&str>) -> Result<SessionFetch, AppError> {
        Ok(drain_pages(self, player_id, server_id, self.max_pages).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::{PageLinks, SessionAttributes, SessionRecord};
    use std::sync::Mutex;

    fn records(count: usize, offset: usize) -> Vec<SessionRecord> {
        (0..count)
            .map(|i| SessionRecord {
                id: format!("s{}", offset + i),
                attributes: SessionAttributes {
                    start: "2024-03-01T10:00:00Z".to_string(),
                    stop: Some("2024-03-01T11:00:00Z".to_string()),
                },
            })
            .collect()
    }

    fn page(count: usize, offset: usize, next: Option<&str>) -> SessionPage {
        SessionPage {
            data: records(count, offset),
            links: PageLinks { next: next.map(String::from) },
        }
    }

    /// Serves a scripted sequence of page results regardless of URL.
    struct ScriptedPages {
        script: Mutex<Vec<Result<SessionPage, AppError>>>,
    }

    impl ScriptedPages {
        fn new(script: Vec<Result<SessionPage, AppError>>) -> Self {
            let mut script = script;
            script.reverse();
            Self { script: Mutex::new(script) }
        }
    }

    #[async_trait]
    impl SessionPages for ScriptedPages {
        async fn first_page(&self, _player_id: &str, _server_id: Option<&str>) -> Result<SessionPage, AppError> {
            self.script.lock().unwrap().pop().expect("script exhausted")
        }

        async fn page_at(&self, _next_url: &str) -> Result<SessionPage, AppError> {
            self.script.lock().unwrap().pop().expect("script exhausted")
        }
    }

    #[tokio::test]
    async fn drains_three_pages_in_order() {
        let pages = ScriptedPages::new(vec![
            Ok(page(100, 0, Some("cursor-2"))),
            Ok(page(100, 100, Some("cursor-3"))),
            Ok(page(42, 200, None)),
        ]);

        let fetch = drain_pages(&pages, "p1", None, 100).await;

        assert_eq!(fetch.records.len(), 242);
        assert!(!fetch.truncated);
        assert_eq!(fetch.records[0].id, "s0");
        assert_eq!(fetch.records[241].id, "s241");
    }

    #[tokio::test]
    async fn failed_second_page_returns_first_page_only() {
        let pages = ScriptedPages::new(vec![
            Ok(page(100, 0, Some("cursor-2"))),
            Err(AppError::unavailable(TRACKER_SOURCE, 500)),
        ]);

        let fetch = drain_pages(&pages, "p1", None, 100).await;

        assert_eq!(fetch.records.len(), 100);
        assert!(fetch.truncated);
    }

    #[tokio::test]
    async fn failed_first_page_returns_empty_not_error() {
        let pages = ScriptedPages::new(vec![Err(AppError::unavailable(TRACKER_SOURCE, 503))]);

        let fetch = drain_pages(&pages, "p1", None, 100).await;

        assert!(fetch.records.is_empty());
        assert!(fetch.truncated);
    }

    #[tokio::test]
    async fn page_cap_bounds_an_endless_cursor_chain() {
        let pages = ScriptedPages::new(vec![
            Ok(page(10, 0, Some("cursor-2"))),
            Ok(page(10, 10, Some("cursor-3"))),
            Ok(page(10, 20, Some("cursor-4"))),
        ]);

        let fetch = drain_pages(&pages, "p1", None, 3).await;

        assert_eq!(fetch.records.len(), 30);
        assert!(fetch.truncated);
    }

    #[tokio::test]
    async fn cap_equal_to_page_count_is_not_truncation() {
        let pages = ScriptedPages::new(vec![
            Ok(page(10, 0, Some("cursor-2"))),
            Ok(page(5, 10, None)),
        ]);

        let fetch = drain_pages(&pages, "p1", None, 2).await;

        assert_eq!(fetch.records.len(), 15);
        assert!(!fetch.truncated);
    }
}
