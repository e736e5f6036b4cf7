//! The post-composition dashboard: owns the input, the generation state
//! machine, and the copy/download actions on the current post.

use crate::ai::{CaptionClient, CaptionService, ImageClient, ImageGenerationService};
use crate::clipboard::{Clipboard, CopyFeedback};
use crate::download::Downloader;
use crate::generator::PostGenerator;
use crate::image::{PreviewRegistry, UploadedFile};
use crate::input::InputState;
use crate::models::{Config, GeneratedPost, Platform, PostStyle, PreviewRef};
use crate::preview::{self, PostPreview};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{error, info, warn};

/// Generation lifecycle. Only generation outcomes move it out of `Loading`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    Ready(GeneratedPost),
    Failed(String),
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }
}

/// Injectable service bundle used to construct a [`Dashboard`] in tests and
/// harnesses. `None` marks an unconfigured service.
pub struct DashboardServices {
    pub caption: Option<Box<dyn CaptionService>>,
    pub image: Option<Box<dyn ImageGenerationService>>,
    pub http: reqwest::Client,
}

/// Puts the view back to `Idle` if a generation future is dropped before it
/// records its outcome.
struct LoadingGuard<'a> {
    state: &'a Mutex<ViewState>,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(state: &'a Mutex<ViewState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Generation cancelled before completion");
            *self.state.lock().unwrap_or_else(PoisonError::into_inner) = ViewState::Idle;
        }
    }
}

pub struct Dashboard {
    generator: PostGenerator,
    downloader: Downloader,
    registry: PreviewRegistry,
    input: Mutex<InputState>,
    state: Mutex<ViewState>,
    notice: Mutex<Option<String>>,
    copy: CopyFeedback,
}

impl Dashboard {
    pub fn with_services(services: DashboardServices) -> Self {
        let registry = PreviewRegistry::new();
        Self {
            generator: PostGenerator::new(services.caption, services.image),
            downloader: Downloader::new(services.http, registry.clone()),
            input: Mutex::new(InputState::new(registry.clone())),
            registry,
            state: Mutex::new(ViewState::Idle),
            notice: Mutex::new(None),
            copy: CopyFeedback::new(),
        }
    }

    /// Build real clients for every configured endpoint.
    pub fn from_config(config: &Config) -> Self {
        // Reuse one HTTP connection pool across clients.
        let http = reqwest::Client::new();

        let caption: Option<Box<dyn CaptionService>> = config.caption.clone().map(|endpoint| {
            info!("Caption endpoint: {}", endpoint.url);
            Box::new(CaptionClient::new_with_client(endpoint, http.clone()))
                as Box<dyn CaptionService>
        });
        let image: Option<Box<dyn ImageGenerationService>> =
            config.image.clone().map(|endpoint| {
                info!("Image endpoint: {}", endpoint.url);
                Box::new(ImageClient::new_with_client(endpoint, http.clone()))
                    as Box<dyn ImageGenerationService>
            });

        Self::with_services(DashboardServices {
            caption,
            image,
            http,
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_input(&self) -> MutexGuard<'_, InputState> {
        self.input.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_notice(&self, message: Option<String>) {
        *self.notice.lock().unwrap_or_else(PoisonError::into_inner) = message;
    }

    /// Apply an edit unless a generation is in flight.
    fn edit<R>(&self, f: impl FnOnce(&mut InputState) -> R) -> Result<R> {
        let state = self.lock_state();
        if state.is_loading() {
            return Err(Error::Busy);
        }
        let mut input = self.lock_input();
        Ok(f(&mut input))
    }

    pub fn set_prompt(&self, prompt: impl Into<String>) -> Result<()> {
        self.edit(|input| input.set_prompt(prompt))
    }

    pub fn set_platform(&self, platform: Platform) -> Result<()> {
        self.edit(|input| input.set_platform(platform))
    }

    pub fn set_style(&self, style: PostStyle) -> Result<()> {
        self.edit(|input| input.set_style(style))
    }

    /// Returns the effective flag (always false with an upload attached).
    pub fn set_want_image(&self, want_image: bool) -> Result<bool> {
        self.edit(|input| input.set_want_image(want_image))
    }

    pub fn attach_image(&self, file: UploadedFile) -> Result<PreviewRef> {
        let outcome = self.edit(|input| input.attach_image(file))?;
        match outcome {
            Ok(reference) => {
                self.set_notice(None);
                Ok(reference)
            }
            Err(e) => {
                self.set_notice(Some(e.to_string()));
                Err(e.into())
            }
        }
    }

    pub fn clear_image(&self) -> Result<()> {
        self.edit(|input| input.clear_image())?;
        self.set_notice(None);
        Ok(())
    }

    pub fn view_state(&self) -> ViewState {
        self.lock_state().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock_state().is_loading()
    }

    /// Message to show in the error box, if any.
    pub fn error_message(&self) -> Option<String> {
        if let ViewState::Failed(message) = &*self.lock_state() {
            return Some(message.clone());
        }
        self.notice
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current_post(&self) -> Option<GeneratedPost> {
        match &*self.lock_state() {
            ViewState::Ready(post) => Some(post.clone()),
            _ => None,
        }
    }

    pub fn preview_registry(&self) -> &PreviewRegistry {
        &self.registry
    }

    /// Run one generation for the current input. Refused with
    /// [`Error::Busy`] while another is in flight.
    pub async fn generate(&self) -> Result<GeneratedPost> {
        let request = {
            let mut state = self.lock_state();
            if state.is_loading() {
                warn!("Generation requested while another is in flight");
                return Err(Error::Busy);
            }
            let request = self.lock_input().to_request();
            match request {
                Ok(request) => {
                    *state = ViewState::Loading;
                    request
                }
                Err(e) => {
                    *state = ViewState::Failed(e.to_string());
                    return Err(e.into());
                }
            }
        };
        let mut guard = LoadingGuard::new(&self.state);
        self.set_notice(None);
        self.copy.reset();

        let outcome = self.generator.generate(&request).await;

        guard.disarm();
        let mut state = self.lock_state();
        match outcome {
            Ok(post) => {
                *state = ViewState::Ready(post.clone());
                Ok(post)
            }
            Err(e) => {
                let message = e.user_message();
                error!("Error during generation: {}", message);
                *state = ViewState::Failed(message);
                Err(e)
            }
        }
    }

    /// Preview card for the current post, styled for the selected platform.
    pub fn preview(&self) -> Option<PostPreview> {
        let post = self.current_post()?;
        let platform = self.lock_input().platform();
        Some(preview::render(
            platform,
            &post.content,
            post.image_url.as_ref(),
        ))
    }

    pub fn copy_caption(&self, clipboard: &dyn Clipboard) -> Result<()> {
        let post = self
            .current_post()
            .ok_or_else(|| Error::Clipboard("No caption to copy".to_string()))?;
        self.copy.copy(clipboard, &post.content)
    }

    pub fn is_copied(&self) -> bool {
        self.copy.is_copied()
    }

    /// Save the current post's image into `dir`.
    pub async fn download_image(&self, dir: &Path) -> Result<PathBuf> {
        let post = self.current_post();
        let Some(source) = post.and_then(|p| p.image_url) else {
            self.set_notice(Some(Error::NoImage.to_string()));
            return Err(Error::NoImage);
        };
        let (platform, prompt) = {
            let input = self.lock_input();
            (input.platform(), input.prompt().to_string())
        };

        match self
            .downloader
            .download(&source, platform, &prompt, dir)
            .await
        {
            Ok(path) => Ok(path),
            Err(e) => {
                self.set_notice(Some(e.user_message()));
                Err(e)
            }
        }
    }
}
