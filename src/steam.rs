//! Steam review fetching.
//!
//! Resolves a game title to an app id (exactly, or fuzzily when asked) and
//! pulls the most helpful reviews for it.

use crate::config::SteamConfig;
use crate::summary::Review;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// User-Agent string identifying this client
const USER_AGENT: &str = concat!("steamsnap/", env!("CARGO_PKG_VERSION"));

/// Default timeout for HTTP requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_RETRIES: u32 = 3;
const RETRY_STATUSES: [StatusCode; 4] = [
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

#[derive(Error, Debug)]
pub enum SteamError {
    #[error("failed to fetch from Steam: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Steam returned {status} for {url}")]
    Status { status: StatusCode, url: String },
    #[error("invalid Steam URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("game not found: {0}")]
    NotFound(String),
}

/// One entry of the public app list
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct App {
    pub appid: u64,
    pub name: String,
}

#[derive(Deserialize)]
struct AppListResponse {
    applist: AppList,
}

#[derive(Deserialize)]
struct AppList {
    apps: Vec<App>,
}

#[derive(Deserialize)]
struct ReviewsResponse {
    #[serde(default)]
    reviews: Vec<RawReview>,
}

#[derive(Deserialize)]
struct RawReview {
    author: RawAuthor,
    review: String,
    #[serde(default)]
    voted_up: bool,
}

#[derive(Deserialize)]
struct RawAuthor {
    steamid: String,
}

pub struct SteamClient {
    http: Client,
    config: SteamConfig,
}

/// Create a configured HTTP client for Steam
fn create_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

impl SteamClient {
    pub fn new(config: SteamConfig) -> Result<Self, SteamError> {
        Ok(Self {
            http: create_client()?,
            config,
        })
    }

    /// Fetch up to `count` reviews for the game called `title`
    pub async fn fetch_reviews(&self, title: &str, count: u32, fuzzy: bool) -> Result<Vec<Review>, SteamError> {
        let appid = self.resolve_app_id(title, fuzzy).await?;
        debug!(appid, title, "resolved app id");

        let base = self.config.reviews_url.replace("{appid}", &appid.to_string());
        let count = count.to_string();
        let url = Url::parse_with_params(
            &base,
            &[
                ("json", "1"),
                ("num_per_page", count.as_str()),
                ("language", self.config.language.as_str()),
                ("filter", self.config.filter.as_str()),
            ],
        )?;

        let body: ReviewsResponse = self.get_with_retry(url).await?.json().await?;
        Ok(into_reviews(body))
    }

    /// Look up the app id for a title in the public app list
    pub async fn resolve_app_id(&self, title: &str, fuzzy: bool) -> Result<u64, SteamError> {
        let url = Url::parse(&self.config.app_list_url)?;
        let list: AppListResponse = self.get_with_retry(url).await?.json().await?;
        match_app(&list.applist.apps, title, fuzzy, self.config.fuzzy_cutoff)
    }

    /// GET with retries on transport errors and 5xx gateway statuses
    async fn get_with_retry(&self, url: Url) -> Result<reqwest::Response, SteamError> {
        let mut attempt: u32 = 0;
        loop {
            let outcome = self.http.get(url.clone()).send().await;
            let retryable = match &outcome {
                Ok(response) => RETRY_STATUSES.contains(&response.status()),
                Err(err) => err.is_connect() || err.is_timeout(),
            };

            if retryable && attempt < MAX_RETRIES {
                let delay = Duration::from_millis(self.config.retry_backoff_ms).saturating_mul(2u32.pow(attempt));
                warn!(url = %url, attempt = attempt + 1, delay_ms = delay.as_millis() as u64, "Steam request failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            let response = outcome?;
            let status = response.status();
            if !status.is_success() {
                return Err(SteamError::Status {
                    status,
                    url: url.to_string(),
                });
            }
            return Ok(response);
        }
    }
}

/// Pick the app matching `title`: exact (case-insensitive) first, then the
/// most similar name at or above `cutoff` when `fuzzy` is set.
pub fn match_app(apps: &[App], title: &str, fuzzy: bool, cutoff: f64) -> Result<u64, SteamError> {
    let wanted = title.trim().to_lowercase();
    if let Some(app) = apps.iter().find(|app| app.name.to_lowercase() == wanted) {
        return Ok(app.appid);
    }

    if !fuzzy {
        return Err(SteamError::NotFound(format!("{} (tip: use --fuzzy)", title)));
    }

    let mut best: Option<(&App, f64)> = None;
    for app in apps {
        let score = strsim::normalized_levenshtein(&wanted, &app.name.to_lowercase());
        if score >= cutoff && best.map_or(true, |(_, top)| score > top) {
            best = Some((app, score));
        }
    }

    match best {
        Some((app, score)) => {
            debug!(name = %app.name, score, "fuzzy title match");
            Ok(app.appid)
        }
        None => Err(SteamError::NotFound(format!("{} (no fuzzy match above cutoff)", title))),
    }
}

fn into_reviews(body: ReviewsResponse) -> Vec<Review> {
    body.reviews
        .into_iter()
        .map(|raw| Review {
            author: raw.author.steamid,
            text: raw.review,
            recommended: raw.voted_up,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apps() -> Vec<App> {
        serde_json::from_str::<AppListResponse>(
            r#"{"applist":{"apps":[
                {"appid":1145360,"name":"Hades"},
                {"appid":1145350,"name":"Hades II"},
                {"appid":413150,"name":"Stardew Valley"},
                {"appid":367520,"name":"Hollow Knight"}
            ]}}"#,
        )
        .unwrap()
        .applist
        .apps
    }

    #[test]
    fn exact_match_ignores_case_and_padding() {
        assert_eq!(match_app(&apps(), "  stardew VALLEY ", false, 0.68).unwrap(), 413150);
        assert_eq!(match_app(&apps(), "Hades", true, 0.68).unwrap(), 1145360);
    }

    #[test]
    fn missing_title_without_fuzzy_is_not_found() {
        let err = match_app(&apps(), "Stardew Valey", false, 0.68).unwrap_err();
        assert!(matches!(err, SteamError::NotFound(_)));
        assert!(err.to_string().contains("--fuzzy"));
    }

    #[test]
    fn fuzzy_picks_closest_name() {
        assert_eq!(match_app(&apps(), "Stardew Valey", true, 0.68).unwrap(), 413150);
        assert_eq!(match_app(&apps(), "hollow night", true, 0.68).unwrap(), 367520);
    }

    #[test]
    fn fuzzy_respects_cutoff() {
        let err = match_app(&apps(), "Celeste", true, 0.68).unwrap_err();
        assert!(matches!(err, SteamError::NotFound(_)));
    }

    #[test]
    fn reviews_map_to_domain_type() {
        let body: ReviewsResponse = serde_json::from_str(
            r#"{"success":1,"reviews":[
                {"author":{"steamid":"1","num_reviews":3},"review":"Loved it","voted_up":true},
                {"author":{"steamid":"2"},"review":"Meh"}
            ]}"#,
        )
        .unwrap();
        let reviews = into_reviews(body);
        assert_eq!(
            reviews,
            vec![
                Review { author: "1".into(), text: "Loved it".into(), recommended: true },
                Review { author: "2".into(), text: "Meh".into(), recommended: false },
            ]
        );
    }

    #[test]
    fn reviews_field_may_be_absent() {
        let body: ReviewsResponse = serde_json::from_str(r#"{"success":2}"#).unwrap();
        assert!(into_reviews(body).is_empty());
    }
}
