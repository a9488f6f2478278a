use std::io::Cursor;
use std::time::Duration;

use reqwest::Client;

use crate::delay::ProcessingDelay;
use crate::error::InspectorError;

/// HTTP client that fetches an image and reports its pixel dimensions.
///
/// Only the container header is decoded — enough to obtain width and height
/// for JPEG and PNG payloads — so large images cost one fetch, not a full
/// pixel decode. Non-2xx responses and undecodable bodies are surfaced as
/// typed errors.
pub struct ImageInspector {
    client: Client,
    delay: ProcessingDelay,
}

/// Pixel dimensions of a fetched image, plus the derived perimeter metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
    /// `2 × (width + height)`.
    pub perimeter: u64,
}

impl ImageInspector {
    /// Creates an `ImageInspector` with configured timeout, `User-Agent`,
    /// and simulated-processing delay strategy.
    ///
    /// # Errors
    ///
    /// Returns [`InspectorError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        delay: ProcessingDelay,
    ) -> Result<Self, InspectorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, delay })
    }

    /// Fetch `url` and derive the image's dimensions and perimeter.
    ///
    /// The full body is read, the container header is probed for
    /// width/height, and the configured processing delay is awaited before
    /// returning.
    ///
    /// # Errors
    ///
    /// - [`InspectorError::Http`] — transport failure (DNS, connect, timeout).
    /// - [`InspectorError::UnexpectedStatus`] — any non-2xx response.
    /// - [`InspectorError::Decode`] — body is not a decodable image.
    pub async fn inspect(&self, url: &str) -> Result<ImageDimensions, InspectorError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InspectorError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.bytes().await?;
        let (width, height) =
            probe_dimensions(&body).ok_or_else(|| InspectorError::Decode {
                url: url.to_owned(),
            })?;
        let perimeter = 2 * (u64::from(width) + u64::from(height));

        tracing::debug!(url, width, height, perimeter, "inspected image");

        self.delay.wait().await;

        Ok(ImageDimensions {
            width,
            height,
            perimeter,
        })
    }
}

/// Read width/height from the image header without decoding pixel data.
fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
