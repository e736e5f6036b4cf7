//! Saving a post's image to disk.
//!
//! Uploaded images are written straight from the local preview; generated
//! images are fetched from their remote URL first, which can fail for
//! network or cross-origin reasons.

use crate::ai::image::IMAGE_TIMEOUT;
use crate::image::mime::extension_for_mime;
use crate::image::PreviewRegistry;
use crate::models::{ImageSource, Platform};
use crate::{Error, Result};
use chrono::Local;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SAFE_PROMPT_CHARS: usize = 20;

pub struct Downloader {
    client: Client,
    registry: PreviewRegistry,
    timeout: Duration,
}

impl Downloader {
    pub fn new(client: Client, registry: PreviewRegistry) -> Self {
        Self {
            client,
            registry,
            timeout: IMAGE_TIMEOUT,
        }
    }

    #[cfg(test)]
    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Save `source` into `dir` and return the written path.
    pub async fn download(
        &self,
        source: &ImageSource,
        platform: Platform,
        prompt: &str,
        dir: &Path,
    ) -> Result<PathBuf> {
        let (kind, bytes, mime) = match source {
            ImageSource::Preview(reference) => {
                let image = self.registry.resolve(*reference).ok_or_else(|| {
                    Error::Download(format!("Preview {} is no longer available", reference))
                })?;
                ("uploaded", image.bytes().to_vec(), image.mime().to_string())
            }
            ImageSource::Remote(url) => {
                let (bytes, mime) = self.fetch(url).await?;
                ("generated", bytes, mime)
            }
        };

        let filename = download_filename(kind, platform, prompt, &mime);
        let path = dir.join(filename);
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!("Saved image to {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    async fn fetch(&self, url: &str) -> Result<(Vec<u8>, String)> {
        tracing::debug!("Fetching image from {}", url);

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Error downloading image: {}", e);
                Error::Download(format!(
                    "{}. (This might be a cross-origin or network issue; a proxy may be needed for reliable downloads.)",
                    e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Download(format!("HTTP error! status: {}", status)));
        }

        let mime = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Download(e.to_string()))?;

        Ok((bytes.to_vec(), mime))
    }
}

/// First characters of the prompt with anything non-alphanumeric replaced,
/// or today's date when the prompt is empty.
pub fn safe_prompt(prompt: &str) -> String {
    let safe: String = prompt
        .chars()
        .take(SAFE_PROMPT_CHARS)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if safe.is_empty() {
        Local::now().format("%Y-%m-%d").to_string()
    } else {
        safe
    }
}

pub fn download_filename(kind: &str, platform: Platform, prompt: &str, mime: &str) -> String {
    format!(
        "{}_image_{}_{}.{}",
        kind,
        platform,
        safe_prompt(prompt),
        extension_for_mime(mime)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{validate, UploadedFile};
    use tempfile::tempdir;

    #[test]
    fn test_safe_prompt() {
        assert_eq!(safe_prompt("launch of our new app!"), "launch_of_our_new_ap");
        assert_eq!(safe_prompt("café"), "caf_");
        assert_eq!(safe_prompt(""), Local::now().format("%Y-%m-%d").to_string());
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(
            download_filename("generated", Platform::Instagram, "sunset hike", "image/png"),
            "generated_image_Instagram_sunset_hike.png"
        );
        assert_eq!(
            download_filename("uploaded", Platform::Twitter, "x", ""),
            "uploaded_image_Twitter_x.jpg"
        );
    }

    #[tokio::test]
    async fn test_download_local_preview() {
        let registry = PreviewRegistry::new();
        let image =
            validate(UploadedFile::new(None, "image/webp", vec![1, 2, 3, 4])).unwrap();
        let handle = registry.create(&image);
        let downloader = Downloader::new(Client::new(), registry);
        let dir = tempdir().unwrap();

        let path = downloader
            .download(
                &ImageSource::Preview(handle.reference()),
                Platform::Facebook,
                "team photo",
                dir.path(),
            )
            .await
            .unwrap();

        assert!(path.ends_with("uploaded_image_Facebook_team_photo.webp"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_download_released_preview_fails() {
        let registry = PreviewRegistry::new();
        let image = validate(UploadedFile::new(None, "image/png", vec![1])).unwrap();
        let reference = registry.create(&image).reference();
        let downloader = Downloader::new(Client::new(), registry);
        let dir = tempdir().unwrap();

        let err = downloader
            .download(&ImageSource::Preview(reference), Platform::Facebook, "", dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Download(_)));
    }

    #[tokio::test]
    async fn test_download_remote_image() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/img/1.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body([0x89, 0x50, 0x4E, 0x47])
            .create_async()
            .await;

        let downloader = Downloader::new(Client::new(), PreviewRegistry::new());
        let dir = tempdir().unwrap();
        let url = format!("{}/img/1.png", server.url());

        let path = downloader
            .download(&ImageSource::Remote(url), Platform::LinkedIn, "office", dir.path())
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(path.ends_with("generated_image_LinkedIn_office.png"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![0x89, 0x50, 0x4E, 0x47]);
    }

    #[tokio::test]
    async fn test_download_remote_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/expired.png")
            .with_status(403)
            .create_async()
            .await;

        let downloader = Downloader::new(Client::new(), PreviewRegistry::new());
        let dir = tempdir().unwrap();
        let url = format!("{}/expired.png", server.url());

        let err = downloader
            .download(&ImageSource::Remote(url), Platform::LinkedIn, "x", dir.path())
            .await
            .unwrap_err();
        match err {
            Error::Download(message) => assert!(message.contains("403")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_download_unreachable_mentions_proxy() {
        let downloader = Downloader::new(Client::new(), PreviewRegistry::new());
        let dir = tempdir().unwrap();

        let err = downloader
            .download(
                &ImageSource::Remote("http://127.0.0.1:1/x.png".to_string()),
                Platform::LinkedIn,
                "x",
                dir.path(),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("proxy"));
    }

    #[tokio::test]
    async fn test_download_stalled_host_times_out() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(vec![0x89, 0x50, 0x4E, 0x47])
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let downloader = Downloader::new(Client::new(), PreviewRegistry::new())
            .with_timeout(Duration::from_millis(100));
        let dir = tempdir().unwrap();
        let url = format!("{}/slow.png", server.uri());

        let started = std::time::Instant::now();
        let err = downloader
            .download(&ImageSource::Remote(url), Platform::LinkedIn, "x", dir.path())
            .await
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(err, Error::Download(_)));
    }
}
