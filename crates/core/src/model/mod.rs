//! Lazily loaded pre-harvest yield model.

pub mod linear;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::domain::prediction::FeatureVector;

/// The one capability the service needs from a trained model.
pub trait YieldPredictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> anyhow::Result<f64>;
}

/// Turns the raw bytes of a model artifact into a predictor.
pub trait ModelLoader: Send + Sync {
    fn format(&self) -> &'static str;

    fn load(&self, bytes: &[u8]) -> anyhow::Result<Arc<dyn YieldPredictor>>;
}

/// Single-slot cache in front of the model artifact.
///
/// While the artifact is missing or unreadable every call retries the load;
/// once a load succeeds the instance is kept for the life of the gateway, even
/// if the file later disappears. The slot lock is held across the load so
/// concurrent first callers share one instance.
pub struct ModelGateway {
    path: PathBuf,
    loader: Box<dyn ModelLoader>,
    slot: tokio::sync::Mutex<Option<Arc<dyn YieldPredictor>>>,
}

impl std::fmt::Debug for ModelGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelGateway")
            .field("path", &self.path)
            .field("format", &self.loader.format())
            .finish_non_exhaustive()
    }
}

impl ModelGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_loader(path, Box::new(linear::JsonLinearLoader))
    }

    pub fn with_loader(path: impl Into<PathBuf>, loader: Box<dyn ModelLoader>) -> Self {
        Self {
            path: path.into(),
            loader,
            slot: tokio::sync::Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached model, loading it first if needed. `None` means the
    /// model is unavailable right now.
    pub async fn get_model(&self) -> Option<Arc<dyn YieldPredictor>> {
        let mut guard = self.slot.lock().await;
        if let Some(model) = guard.as_ref() {
            return Some(Arc::clone(model));
        }

        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            tracing::error!(path = %self.path.display(), "pre-harvest model file not found");
            return None;
        }

        match self.load().await {
            Ok(model) => {
                tracing::info!(
                    path = %self.path.display(),
                    format = self.loader.format(),
                    "pre-harvest model loaded"
                );
                *guard = Some(Arc::clone(&model));
                Some(model)
            }
            Err(err) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %format!("{err:#}"),
                    "failed to load pre-harvest model"
                );
                None
            }
        }
    }

    pub async fn is_loaded(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    async fn load(&self) -> anyhow::Result<Arc<dyn YieldPredictor>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("failed to read model artifact {}", self.path.display()))?;
        self.loader
            .load(&bytes)
            .with_context(|| format!("failed to decode {} model artifact", self.loader.format()))
    }
}
