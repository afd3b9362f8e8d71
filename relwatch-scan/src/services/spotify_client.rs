//! Spotify Web API client
//!
//! Thin [`CatalogClient`] over the Web API. Token acquisition is not handled
//! here: the client is built with an already-issued bearer token.
//!
//! # Status mapping
//! - 429 → `RateLimited` (Retry-After seconds, 1 s when absent)
//! - 401/403 → `Authorization`
//! - 5xx, timeouts, connection failures → `Transient`
//! - other non-success → `Rejected`
//! - undecodable body → `Parse`

use super::CatalogClient;
use crate::config::ApiSettings;
use crate::error::CatalogError;
use crate::models::{EntityPage, FollowedEntity, Release, ReleaseKind, ReleasePage, TrackRef};
use async_trait::async_trait;
use relwatch_common::{DatePrecision, ReleaseDate};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("relwatch/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Album tracks endpoint page limit
const TRACK_PAGE_LIMIT: u32 = 50;
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);
/// Longest server-requested wait honored per retry
const MAX_RETRY_AFTER: Duration = Duration::from_secs(24 * 60 * 60);

// ============================================================================
// Response shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct FollowingResponse {
    artists: CursorPage<ApiArtist>,
}

#[derive(Debug, Deserialize)]
struct CursorPage<T> {
    items: Vec<T>,
    #[serde(default)]
    cursors: Option<Cursors>,
}

#[derive(Debug, Deserialize)]
struct Cursors {
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OffsetPage<T> {
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiAlbum {
    id: String,
    name: String,
    release_date: String,
    #[serde(default)]
    release_date_precision: Option<DatePrecision>,
    #[serde(default)]
    total_tracks: u32,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: String,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylist {
    name: String,
    owner: ApiUser,
}

#[derive(Debug, Serialize)]
struct AppendBody<'a> {
    uris: Vec<&'a str>,
}

/// Result of the account/playlist ownership check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessCheck {
    pub user_id: String,
    pub user_name: Option<String>,
    pub playlist_name: String,
    pub owner_id: String,
    pub owner_name: Option<String>,
}

impl AccessCheck {
    /// Appends only succeed when the token's user owns the playlist
    pub fn owner_matches(&self) -> bool {
        self.user_id == self.owner_id
    }
}

// ============================================================================
// Client
// ============================================================================

pub struct SpotifyClient {
    http_client: Client,
    base_url: String,
    market: Option<String>,
}

impl SpotifyClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", settings.access_token))
            .map_err(|_| CatalogError::Authorization("access token contains invalid characters".into()))?;
        headers.insert(header::AUTHORIZATION, bearer);

        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| CatalogError::Transient(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            http_client,
            base_url: settings.base_url.clone(),
            market: settings.market.clone(),
        })
    }

    /// Who the token belongs to, and who owns the target playlist
    pub async fn check_access(&self, playlist_id: &str) -> Result<AccessCheck, CatalogError> {
        let user: ApiUser = self.get_json("me", &[]).await?;
        let playlist: ApiPlaylist = self
            .get_json(
                &format!("playlists/{playlist_id}"),
                &[("fields", "name,owner(id,display_name)".to_string())],
            )
            .await?;

        Ok(AccessCheck {
            user_id: user.id,
            user_name: user.display_name,
            playlist_name: playlist.name,
            owner_id: playlist.owner.id,
            owner_name: playlist.owner.display_name,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let url = self.url(path);
        debug!(url = %url, "GET");

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(map_transport_error)?;

        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Parse(format!("{path}: {e}")))
    }
}

#[async_trait]
impl CatalogClient for SpotifyClient {
    async fn list_followed(
        &self,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<EntityPage, CatalogError> {
        let mut query = vec![
            ("type", "artist".to_string()),
            ("limit", page_size.to_string()),
        ];
        if let Some(after) = cursor {
            query.push(("after", after.to_string()));
        }

        let response: FollowingResponse = self.get_json("me/following", &query).await?;
        Ok(EntityPage {
            items: response
                .artists
                .items
                .into_iter()
                .map(|a| FollowedEntity::new(a.id, a.name))
                .collect(),
            next_cursor: response.artists.cursors.and_then(|c| c.after),
        })
    }

    async fn list_releases(
        &self,
        entity_id: &str,
        kind: ReleaseKind,
        page: u32,
        page_size: u32,
    ) -> Result<ReleasePage, CatalogError> {
        let mut query = vec![
            ("include_groups", kind.as_str().to_string()),
            ("limit", page_size.to_string()),
            ("offset", (page * page_size).to_string()),
        ];
        if let Some(market) = &self.market {
            query.push(("market", market.clone()));
        }

        let response: OffsetPage<ApiAlbum> = self
            .get_json(&format!("artists/{entity_id}/albums"), &query)
            .await?;

        Ok(ReleasePage {
            items: response
                .items
                .into_iter()
                .filter_map(|album| to_release(album, kind))
                .collect(),
            has_next: response.next.is_some(),
        })
    }

    async fn list_tracks(&self, release_id: &str, limit: u32) -> Result<Vec<TrackRef>, CatalogError> {
        let mut tracks = Vec::new();
        let mut offset = 0u32;

        while (tracks.len() as u32) < limit {
            let page_limit = (limit - tracks.len() as u32).min(TRACK_PAGE_LIMIT);
            let mut query = vec![
                ("limit", page_limit.to_string()),
                ("offset", offset.to_string()),
            ];
            if let Some(market) = &self.market {
                query.push(("market", market.clone()));
            }

            let page: OffsetPage<ApiTrack> = self
                .get_json(&format!("albums/{release_id}/tracks"), &query)
                .await?;

            let fetched = page.items.len() as u32;
            tracks.extend(page.items.into_iter().map(|t| TrackRef::new(t.uri)));
            offset += fetched;

            if page.next.is_none() || fetched == 0 {
                break;
            }
        }

        tracks.truncate(limit as usize);
        Ok(tracks)
    }

    async fn append_tracks(&self, collection_id: &str, tracks: &[TrackRef]) -> Result<(), CatalogError> {
        let url = self.url(&format!("playlists/{collection_id}/tracks"));
        let body = AppendBody {
            uris: tracks.iter().map(TrackRef::as_str).collect(),
        };
        debug!(url = %url, tracks = tracks.len(), "POST");

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        check_status(response).await?;
        Ok(())
    }
}

fn to_release(album: ApiAlbum, kind: ReleaseKind) -> Option<Release> {
    let parsed = match album.release_date_precision {
        Some(precision) => ReleaseDate::parse_with_precision(&album.release_date, precision),
        None => ReleaseDate::parse_lenient(&album.release_date),
    };

    match parsed {
        Ok(release_date) => Some(Release {
            id: album.id,
            name: album.name,
            release_date,
            kind,
            track_count: album.total_tracks,
        }),
        Err(e) => {
            warn!(release = %album.name, raw_date = %album.release_date, error = %e, "Dropping release with unusable date");
            None
        }
    }
}

async fn check_status(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after);
    let body = response.text().await.unwrap_or_default();

    Err(classify_status(status, retry_after, body))
}

/// Retry-After in delta-seconds, clamped to [`MAX_RETRY_AFTER`]
fn parse_retry_after(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| Duration::from_secs(secs).min(MAX_RETRY_AFTER))
}

fn classify_status(status: StatusCode, retry_after: Option<Duration>, body: String) -> CatalogError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => CatalogError::RateLimited {
            retry_after: retry_after.unwrap_or(DEFAULT_RETRY_AFTER),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CatalogError::Authorization(format!("{status}: {body}"))
        }
        s if s.is_server_error() => CatalogError::Transient(format!("{status}: {body}")),
        s => CatalogError::Rejected {
            status: s.as_u16(),
            message: body,
        },
    }
}

fn map_transport_error(e: reqwest::Error) -> CatalogError {
    if e.is_decode() {
        CatalogError::Parse(e.to_string())
    } else {
        CatalogError::Transient(e.to_string())
    }
}
