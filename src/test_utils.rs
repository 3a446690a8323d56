// Test utilities: fake fetchers, synthetic covers and album fixtures
use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgba, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

use crate::error::FetchError;
use crate::fetch::HttpFetch;
use crate::models::AlbumRecord;

/// Canned reply for one URL
#[derive(Debug, Clone)]
pub enum FakeReply {
    Body(Bytes),
    Status(u16),
    /// Never answers; only a timeout gets past it
    Hang,
}

/// In-memory `HttpFetch` that records every URL it was asked for.
/// Unknown URLs fail with a transport error.
#[derive(Default)]
pub struct FakeFetcher {
    replies: HashMap<String, FakeReply>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: &str, body: impl Into<Bytes>) -> Self {
        self.replies
            .insert(url.to_string(), FakeReply::Body(body.into()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.replies
            .insert(url.to_string(), FakeReply::Status(status));
        self
    }

    pub fn with_hang(mut self, url: &str) -> Self {
        self.replies.insert(url.to_string(), FakeReply::Hang);
        self
    }

    /// Answer `url` with the PNG encoding of `image`
    pub fn with_image(self, url: &str, image: &RgbaImage) -> Self {
        self.with_body(url, png_bytes(image))
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose URL starts with `prefix`
    pub fn requests_to(&self, prefix: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|url| url.starts_with(prefix))
            .collect()
    }
}

#[async_trait]
impl HttpFetch for FakeFetcher {
    async fn get(&self, url: &str) -> Result<Bytes, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());

        // Match on the URL without its query so tests can register API endpoints loosely
        let reply = self
            .replies
            .get(url)
            .or_else(|| url.split('?').next().and_then(|base| self.replies.get(base)))
            .cloned();

        match reply {
            Some(FakeReply::Body(body)) => Ok(body),
            Some(FakeReply::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            Some(FakeReply::Hang) => std::future::pending().await,
            None => Err(FetchError::Transport {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

pub fn solid_image(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, color)
}

/// A color that differs for every index below 100
pub fn index_color(index: usize) -> Rgba<u8> {
    let i = index as u8;
    Rgba([i.wrapping_mul(2), 255 - i, i.wrapping_mul(37), 255])
}

pub fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn cover_url(index: usize) -> String {
    format!("http://covers.test/{}.png", index)
}

/// Albums 0..count, each with one cover candidate at `cover_url(i)`
pub fn test_albums(count: usize) -> Vec<AlbumRecord> {
    (0..count)
        .map(|i| {
            AlbumRecord::new(format!("Album {}", i), format!("Artist {}", i % 5), i)
                .with_play_count((100 - i) as u64)
                .with_cover_candidates(vec![cover_url(i)])
        })
        .collect()
}

/// Fetcher serving a distinct solid cover of `size` for each album from `test_albums`
pub fn fetcher_with_covers(count: usize, size: u32) -> FakeFetcher {
    (0..count).fold(FakeFetcher::new(), |fetcher, i| {
        fetcher.with_image(&cover_url(i), &solid_image(size, size, index_color(i)))
    })
}

/// Last.fm `user.gettopalbums` body listing `albums`, each cover as an extralarge image
pub fn top_albums_json(albums: &[AlbumRecord]) -> String {
    let album: Vec<serde_json::Value> = albums
        .iter()
        .map(|a| {
            let images: Vec<serde_json::Value> = a
                .cover_candidates
                .iter()
                .map(|url| serde_json::json!({"size": "extralarge", "#text": url}))
                .collect();
            serde_json::json!({
                "name": a.name,
                "artist": {"name": a.artist_name, "url": ""},
                "playcount": a.play_count.to_string(),
                "image": images,
                "@attr": {"rank": (a.original_index + 1).to_string()},
            })
        })
        .collect();

    serde_json::json!({ "topalbums": { "album": album } }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_colors_are_distinct() {
        let colors: Vec<_> = (0..100).map(index_color).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_generate_albums() {
        let albums = test_albums(4);

        assert_eq!(albums.len(), 4);
        assert_eq!(albums[2].original_index, 2);
        assert_eq!(albums[2].preferred_cover(), Some(cover_url(2).as_str()));
    }

    #[tokio::test]
    async fn test_fake_fetcher_records_requests() {
        let fetcher = FakeFetcher::new()
            .with_body("http://a.test/", "ok")
            .with_status("http://b.test/", 500);

        assert_eq!(fetcher.get("http://a.test/").await.unwrap(), "ok");
        assert!(matches!(
            fetcher.get("http://b.test/").await,
            Err(FetchError::Status { status: 500, .. })
        ));
        assert!(matches!(
            fetcher.get("http://c.test/").await,
            Err(FetchError::Transport { .. })
        ));
        assert_eq!(fetcher.requests().len(), 3);
        assert_eq!(fetcher.requests_to("http://a.test").len(), 1);
    }
}
