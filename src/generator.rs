//! Post generation: picks the request shape for the current input, issues
//! the caption (and optionally image) calls, and merges the results.

use crate::ai::{CaptionService, ChatMessage, ImageGenerationService, MessagePart};
use crate::error::{Service, ValidationError};
use crate::input::{GenerationRequest, RequestImage};
use crate::models::{GeneratedPost, ImageSource};
use crate::{prompts, Error, Result};
use tracing::info;

/// Which calls a request needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPlan {
    /// Caption an uploaded image.
    VisionCaption,
    /// Caption plus a generated illustration, issued together.
    CaptionWithImage,
    /// Caption from the text prompt alone.
    TextCaption,
}

impl GenerationPlan {
    pub fn for_request(request: &GenerationRequest) -> Self {
        if request.image().is_some() {
            GenerationPlan::VisionCaption
        } else if request.want_image() {
            GenerationPlan::CaptionWithImage
        } else {
            GenerationPlan::TextCaption
        }
    }
}

/// Services are optional; a missing one means its endpoint or key was not
/// configured.
pub struct PostGenerator {
    caption: Option<Box<dyn CaptionService>>,
    image: Option<Box<dyn ImageGenerationService>>,
}

impl PostGenerator {
    pub fn new(
        caption: Option<Box<dyn CaptionService>>,
        image: Option<Box<dyn ImageGenerationService>>,
    ) -> Self {
        Self { caption, image }
    }

    fn caption_service(&self, service: Service) -> Result<&dyn CaptionService> {
        self.caption
            .as_deref()
            .ok_or(Error::MissingConfiguration(service))
    }

    fn image_service(&self) -> Result<&dyn ImageGenerationService> {
        self.image
            .as_deref()
            .ok_or(Error::MissingConfiguration(Service::ImageGeneration))
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedPost> {
        if !request.has_prompt() && request.image().is_none() {
            return Err(ValidationError::EmptyInput.into());
        }

        let plan = GenerationPlan::for_request(request);
        info!(
            "Generating {:?} post for {} ({} style)",
            plan,
            request.platform(),
            request.style()
        );

        match (plan, request.image()) {
            (GenerationPlan::VisionCaption, Some(upload)) => {
                self.vision_caption(request, upload).await
            }
            (GenerationPlan::CaptionWithImage, _) => self.caption_with_image(request).await,
            _ => self.text_caption(request).await,
        }
    }

    async fn vision_caption(
        &self,
        request: &GenerationRequest,
        upload: &RequestImage,
    ) -> Result<GeneratedPost> {
        let caption = self.caption_service(Service::Vision)?;
        let platform = request.platform();

        let data_url = upload.image.data_url().await?;
        let messages = vec![
            ChatMessage::system(prompts::caption_system(platform)),
            ChatMessage::user_parts(vec![
                MessagePart::text(prompts::vision_user(
                    platform,
                    request.style(),
                    request.prompt(),
                )),
                MessagePart::image(data_url, "high"),
            ]),
        ];

        let content = caption.complete(messages, platform).await?;
        info!("Generated caption for uploaded image ({} chars)", content.chars().count());

        Ok(GeneratedPost::new(
            content,
            Some(ImageSource::Preview(upload.preview)),
        ))
    }

    async fn caption_with_image(&self, request: &GenerationRequest) -> Result<GeneratedPost> {
        let caption = self.caption_service(Service::Caption)?;
        let image = self.image_service()?;
        let platform = request.platform();

        let messages = vec![
            ChatMessage::system(prompts::caption_system(platform)),
            ChatMessage::user(prompts::caption_user(
                platform,
                request.style(),
                request.prompt(),
                true,
            )),
        ];
        let image_prompt = prompts::image_prompt(platform, request.style(), request.prompt());
        info!("Image prompt: {}", image_prompt);

        // Both calls always run to completion; either failure fails the post.
        let (content, image_url) = tokio::join!(
            caption.complete(messages, platform),
            image.generate(&image_prompt)
        );
        let content = content?;
        let image_url = image_url?;

        info!("Generated caption and image ({})", image_url);
        Ok(GeneratedPost::new(
            content,
            Some(ImageSource::Remote(image_url)),
        ))
    }

    async fn text_caption(&self, request: &GenerationRequest) -> Result<GeneratedPost> {
        let caption = self.caption_service(Service::Caption)?;
        let platform = request.platform();

        let messages = vec![
            ChatMessage::system(prompts::caption_system(platform)),
            ChatMessage::user(prompts::caption_user(
                platform,
                request.style(),
                request.prompt(),
                false,
            )),
        ];

        let content = caption.complete(messages, platform).await?;
        info!("Generated caption ({} chars)", content.chars().count());
        Ok(GeneratedPost::new(content, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::ChatMessageContent;
    use crate::ai::{MockCaptionClient, MockImageClient};
    use crate::error::ApiError;
    use crate::image::{validate, UploadedFile};
    use crate::models::{Platform, PostStyle, PreviewRef};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn generator(caption: &MockCaptionClient, image: &MockImageClient) -> PostGenerator {
        PostGenerator::new(Some(Box::new(caption.clone())), Some(Box::new(image.clone())))
    }

    fn upload() -> RequestImage {
        RequestImage {
            image: validate(UploadedFile::new(None, "image/png", vec![0x89, 0x50, 0x4E, 0x47]))
                .unwrap(),
            preview: PreviewRef::new(),
        }
    }

    #[test]
    fn test_plan_precedence() {
        let with_upload = GenerationRequest::new(
            "x",
            Platform::Twitter,
            PostStyle::Personal,
            Some(upload()),
            true,
        );
        assert_eq!(
            GenerationPlan::for_request(&with_upload),
            GenerationPlan::VisionCaption
        );

        let with_image =
            GenerationRequest::new("x", Platform::Twitter, PostStyle::Personal, None, true);
        assert_eq!(
            GenerationPlan::for_request(&with_image),
            GenerationPlan::CaptionWithImage
        );

        let text = GenerationRequest::new("x", Platform::Twitter, PostStyle::Personal, None, false);
        assert_eq!(GenerationPlan::for_request(&text), GenerationPlan::TextCaption);
    }

    #[tokio::test]
    async fn test_text_only_issues_single_caption_call() {
        let caption = MockCaptionClient::new().with_caption_response("Launch day!".to_string());
        let image = MockImageClient::new();
        let request = GenerationRequest::new(
            "launch of our new app",
            Platform::LinkedIn,
            PostStyle::Announcement,
            None,
            false,
        );

        let post = generator(&caption, &image).generate(&request).await.unwrap();

        assert_eq!(post, GeneratedPost::new("Launch day!".to_string(), None));
        assert_eq!(caption.get_call_count(), 1);
        assert_eq!(image.get_call_count(), 0);

        let (messages, platform) = &caption.get_requests()[0];
        assert_eq!(*platform, Platform::LinkedIn);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
    }

    #[tokio::test]
    async fn test_vision_branch_reuses_preview_reference() {
        let caption = MockCaptionClient::new().with_caption_response("Golden hour".to_string());
        let image = MockImageClient::new();
        let upload = upload();
        let preview = upload.preview;
        let request = GenerationRequest::new(
            "beach day",
            Platform::Instagram,
            PostStyle::Personal,
            Some(upload),
            false,
        );

        let post = generator(&caption, &image).generate(&request).await.unwrap();

        assert_eq!(post.image_url, Some(ImageSource::Preview(preview)));
        assert_eq!(image.get_call_count(), 0);

        let (messages, _) = &caption.get_requests()[0];
        match &messages[1].content {
            ChatMessageContent::Parts(parts) => {
                assert!(parts[0].text.as_ref().unwrap().contains("\"beach day\""));
                let url = &parts[1].image_url.as_ref().unwrap().url;
                assert!(url.starts_with("data:image/png;base64,"));
            }
            other => panic!("expected multipart content, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_caption_and_image_run_concurrently() {
        let caption = MockCaptionClient::new()
            .with_caption_response("Trail views".to_string())
            .with_delay(Duration::from_secs(10));
        let image = MockImageClient::new()
            .with_image_response("https://images.test/hike.png".to_string())
            .with_delay(Duration::from_secs(10));
        let request = GenerationRequest::new(
            "sunset hike",
            Platform::Instagram,
            PostStyle::Personal,
            None,
            true,
        );

        let started = tokio::time::Instant::now();
        let post = generator(&caption, &image).generate(&request).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(20));
        assert_eq!(post.content, "Trail views");
        assert_eq!(
            post.image_url,
            Some(ImageSource::Remote("https://images.test/hike.png".to_string()))
        );
        assert!(image.get_prompts()[0].contains("vibrant colors, high detail"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_image_failure_fails_whole_post() {
        let caption = MockCaptionClient::new().with_caption_response("ok".to_string());
        let image = MockImageClient::new().with_error(|| ApiError::AsyncJobUnsupported);
        let request =
            GenerationRequest::new("x", Platform::Facebook, PostStyle::Meme, None, true);

        let err = generator(&caption, &image).generate(&request).await.unwrap_err();

        assert!(matches!(err, Error::Api(ApiError::AsyncJobUnsupported)));
        assert_eq!(caption.get_completed_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_caption_failure_still_waits_for_image() {
        let caption = MockCaptionClient::new().with_error(|| ApiError::RateLimited);
        let image = MockImageClient::new().with_delay(Duration::from_secs(30));
        let request =
            GenerationRequest::new("x", Platform::Facebook, PostStyle::Meme, None, true);

        let err = generator(&caption, &image).generate(&request).await.unwrap_err();

        assert!(matches!(err, Error::Api(ApiError::RateLimited)));
        assert_eq!(image.get_completed_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_input_rejected_before_calls() {
        let caption = MockCaptionClient::new();
        let image = MockImageClient::new();
        let request = GenerationRequest::new("  ", Platform::Twitter, PostStyle::Personal, None, true);

        let err = generator(&caption, &image).generate(&request).await.unwrap_err();

        assert!(matches!(err, Error::Validation(ValidationError::EmptyInput)));
        assert_eq!(caption.get_call_count(), 0);
        assert_eq!(image.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_configuration_per_branch() {
        let caption = MockCaptionClient::new();

        let no_image = PostGenerator::new(Some(Box::new(caption.clone())), None);
        let request = GenerationRequest::new("x", Platform::Twitter, PostStyle::Personal, None, true);
        let err = no_image.generate(&request).await.unwrap_err();
        assert!(matches!(
            err,
            Error::MissingConfiguration(Service::ImageGeneration)
        ));
        assert_eq!(caption.get_call_count(), 0);

        let nothing = PostGenerator::new(None, None);
        let text = GenerationRequest::new("x", Platform::Twitter, PostStyle::Personal, None, false);
        assert!(matches!(
            nothing.generate(&text).await.unwrap_err(),
            Error::MissingConfiguration(Service::Caption)
        ));

        let vision = GenerationRequest::new(
            "",
            Platform::Twitter,
            PostStyle::Personal,
            Some(upload()),
            false,
        );
        assert!(matches!(
            nothing.generate(&vision).await.unwrap_err(),
            Error::MissingConfiguration(Service::Vision)
        ));
    }
}
