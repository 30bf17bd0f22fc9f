#[cfg(test)]
mod tests;

pub mod bridge;
pub mod channel;
pub mod config;
#[cfg(feature = "llama")]
pub mod engine;
pub mod error;
pub mod generation;
pub mod sampling;
pub mod text;

// JNI bridge for Android
#[cfg(all(feature = "jni-bridge", target_os = "android"))]
pub mod jni_bridge;

pub use bridge::{InferenceBackend, ModelBridge, NativeBridge};
pub use channel::{dispatch, MethodCall, MethodResult, CHANNEL};
pub use config::EngineConfig;
#[cfg(feature = "llama")]
pub use engine::LlamaEngine;
pub use error::{Error, Result};
