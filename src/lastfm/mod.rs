use serde::{Deserialize, Deserializer};
use std::sync::Arc;

use crate::error::CollageError;
use crate::fetch::HttpFetch;
use crate::models::{AlbumRecord, Period};

pub const DEFAULT_API_URL: &str = "https://ws.audioscrobbler.com/2.0";

#[derive(Debug, Deserialize)]
struct TopAlbumsResponse {
    topalbums: TopAlbums,
}

// Last.fm reports some failures as a 200 with an error document
#[derive(Debug, Deserialize)]
struct ErrorDocument {
    error: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct TopAlbums {
    #[serde(default)]
    album: Vec<Album>,
}

#[derive(Debug, Deserialize)]
struct Album {
    name: String,
    artist: Artist,
    #[serde(deserialize_with = "play_count_from_str_or_number")]
    playcount: u64,
    #[serde(default)]
    image: Vec<Image>,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Image {
    #[serde(rename = "#text")]
    url: String,
    #[serde(default)]
    size: String,
}

fn play_count_from_str_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Rank of a Last.fm image size label, smallest first. Unknown labels sort last.
fn size_rank(size: &str) -> u8 {
    match size {
        "small" => 0,
        "medium" => 1,
        "large" => 2,
        "extralarge" => 3,
        "mega" => 4,
        _ => 5,
    }
}

/// Non-empty image URLs ordered smallest to largest
fn cover_candidates(mut images: Vec<Image>) -> Vec<String> {
    images.retain(|img| !img.url.is_empty());
    images.sort_by_key(|img| size_rank(&img.size));
    images.into_iter().map(|img| img.url).collect()
}

/// Decode a `user.gettopalbums` body. An error document wins over the
/// album list; otherwise the album list's own decode error is reported.
fn parse_top_albums(body: &[u8]) -> Result<Vec<Album>, CollageError> {
    match serde_json::from_slice::<TopAlbumsResponse>(body) {
        Ok(response) => Ok(response.topalbums.album),
        Err(e) => match serde_json::from_slice::<ErrorDocument>(body) {
            Ok(doc) => Err(CollageError::UpstreamRejected {
                code: doc.error,
                message: doc.message,
            }),
            Err(_) => Err(CollageError::MalformedResponse(e)),
        },
    }
}

pub struct LastFmClient {
    api_key: String,
    api_url: String,
    http: Arc<dyn HttpFetch>,
}

impl LastFmClient {
    pub fn new(api_key: String, http: Arc<dyn HttpFetch>) -> Self {
        Self {
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
            http,
        }
    }

    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    fn top_albums_url(&self, username: &str, period: Period, count: usize) -> String {
        format!(
            "{}/?method=user.gettopalbums&format=json&api_key={}&user={}&period={}&limit={}&page=1",
            self.api_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(username),
            period,
            count
        )
    }

    /// Fetch a user's top `count` albums over `period`, in Last.fm's ranking order.
    pub async fn fetch_top_albums(
        &self,
        username: &str,
        period: Period,
        count: usize,
    ) -> Result<Vec<AlbumRecord>, CollageError> {
        tracing::info!("Fetching top {} albums for {} ({})", count, username, period);

        let url = self.top_albums_url(username, period, count);
        let body = self
            .http
            .get(&url)
            .await
            .map_err(CollageError::UpstreamUnavailable)?;

        let albums = parse_top_albums(&body).inspect_err(|e| {
            if let CollageError::UpstreamRejected { code, message } = e {
                tracing::warn!("Last.fm error {} for {}: {}", code, username, message);
            }
        })?;

        let records: Vec<AlbumRecord> = albums
            .into_iter()
            .take(count)
            .enumerate()
            .map(|(index, album)| {
                AlbumRecord::new(album.name, album.artist.name, index)
                    .with_play_count(album.playcount)
                    .with_cover_candidates(cover_candidates(album.image))
            })
            .collect();

        tracing::debug!("Last.fm returned {} albums for {}", records.len(), username);
        Ok(records)
    }
}
