use super::intake::ValidatedImage;
use crate::models::PreviewRef;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct RegistryState {
    live: HashMap<PreviewRef, ValidatedImage>,
    created: usize,
    released: usize,
}

/// Owner of locally held upload previews, addressable by [`PreviewRef`].
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a preview for `image`. The entry lives until the returned
    /// handle is dropped.
    pub fn create(&self, image: &ValidatedImage) -> PreviewHandle {
        let reference = PreviewRef::new();
        let mut state = self.lock();
        state.live.insert(reference, image.clone());
        state.created += 1;
        tracing::debug!("Created preview {} ({} bytes)", reference, image.len());

        PreviewHandle {
            reference,
            registry: self.clone(),
        }
    }

    /// Look up a live preview.
    pub fn resolve(&self, reference: PreviewRef) -> Option<ValidatedImage> {
        self.lock().live.get(&reference).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }

    pub fn created_count(&self) -> usize {
        self.lock().created
    }

    pub fn released_count(&self) -> usize {
        self.lock().released
    }

    fn release(&self, reference: PreviewRef) {
        let mut state = self.lock();
        if state.live.remove(&reference).is_some() {
            state.released += 1;
            tracing::debug!("Released preview {}", reference);
        } else {
            tracing::warn!("Preview {} was already released", reference);
        }
    }
}

/// Scoped ownership of one preview; dropping it releases the preview.
pub struct PreviewHandle {
    reference: PreviewRef,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn reference(&self) -> PreviewRef {
        self.reference
    }
}

impl std::fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PreviewHandle").field(&self.reference).finish()
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(self.reference);
    }
}
