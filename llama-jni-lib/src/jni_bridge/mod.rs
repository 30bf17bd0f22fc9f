//! JNI bridge for Android
//!
//! This module exports the native methods of
//! `com.example.kanana_llm_app.LlamaBridge`.
//!
//! ## Architecture
//!
//! - `types`: Global bridge state and JNI string helpers
//! - `lifecycle`: `JNI_OnLoad` and logcat setup
//! - `native`: `loadModel` / `generate` / `unload`
//! - `method_channel`: whole-message dispatch for the `kanana_llm` channel
//!
//! ## Thread Model
//!
//! - Calls run on whichever Java thread makes them
//! - The global bridge mutex serializes them
//! - Nothing is spawned on the native side

pub mod lifecycle;
pub mod method_channel;
pub mod native;
pub mod types;

// Re-export main entry points
pub use lifecycle::JNI_OnLoad;

pub use native::{
    Java_com_example_kanana_1llm_1app_LlamaBridge_generate,
    Java_com_example_kanana_1llm_1app_LlamaBridge_loadModel,
    Java_com_example_kanana_1llm_1app_LlamaBridge_unload,
};

pub use method_channel::Java_com_example_kanana_1llm_1app_LlamaBridge_handleMethodCall;
