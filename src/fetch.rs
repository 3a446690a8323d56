use async_trait::async_trait;
use bytes::Bytes;
use image::DynamicImage;
use std::time::Duration;

use crate::error::FetchError;

/// GET a URL and hand back the body of a successful response.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// Turn downloaded bytes into a raster.
pub trait ImageDecode: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, image::ImageError>;
}

pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("collage/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()?,
        })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.bytes().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Decodes whatever formats the `image` crate was built with.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateDecoder;

impl ImageDecode for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, image::ImageError> {
        image::load_from_memory(bytes)
    }
}
