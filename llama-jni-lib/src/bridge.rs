//! The three operations the Java `LlamaBridge` class declares.

use log::{error, info, warn};

use crate::config::EngineConfig;
use crate::error::{Error, Result};

/// Surface exposed to the method channel: load, generate, unload.
///
/// Calls are synchronous and run on the caller's thread.
pub trait ModelBridge {
    /// Load the model at `path`; any failure is reported as `false`.
    fn load_model(&mut self, path: &str) -> bool;

    /// Generate text for `prompt`. Failures come back in-band as `"Error: ..."`.
    fn generate(&mut self, prompt: &str) -> String;

    /// Release the loaded model, if any.
    fn unload(&mut self);
}

/// An inference engine that can be loaded from a model file.
pub trait InferenceBackend: Sized {
    fn load(path: &str, config: &EngineConfig) -> Result<Self>;
    fn generate(&mut self, prompt: &str) -> Result<String>;
}

/// Owns at most one loaded model for the lifetime of the bridge.
pub struct NativeBridge<B> {
    backend: Option<B>,
    config: EngineConfig,
}

impl<B: InferenceBackend> NativeBridge<B> {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            backend: None,
            config,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.backend.is_some()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl<B: InferenceBackend> Default for NativeBridge<B> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<B: InferenceBackend> ModelBridge for NativeBridge<B> {
    fn load_model(&mut self, path: &str) -> bool {
        // The old model goes first; a failed load leaves nothing loaded.
        if self.backend.take().is_some() {
            info!("Released previously loaded model");
        }

        match B::load(path, &self.config) {
            Ok(backend) => {
                self.backend = Some(backend);
                true
            }
            Err(e) => {
                error!("loadModel({}) failed: {}", path, e);
                false
            }
        }
    }

    fn generate(&mut self, prompt: &str) -> String {
        let result = match self.backend.as_mut() {
            Some(backend) => backend.generate(prompt),
            None => Err(Error::NotLoaded),
        };
        result.unwrap_or_else(|e| {
            warn!("generate failed: {}", e);
            format!("Error: {}", e)
        })
    }

    fn unload(&mut self) {
        if self.backend.take().is_some() {
            info!("Model unloaded");
        }
    }
}
