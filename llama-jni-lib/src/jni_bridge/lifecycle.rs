//! Library load hook for JNI bridge
//!
//! `System.loadLibrary("llama_jni")` runs `JNI_OnLoad`, which sets up logcat
//! logging before any model call arrives.

use std::ffi::c_void;

use jni::sys::{jint, JNI_VERSION_1_6};
use jni::JavaVM;
use log::info;

/// Logcat tag for everything this library logs
pub const LOG_TAG: &str = "LLAMA_JNI";

/// Initialize Android logger; safe to call more than once
pub fn init_logging() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Debug)
            .with_tag(LOG_TAG),
    );
}

#[no_mangle]
pub extern "C" fn JNI_OnLoad(_vm: JavaVM, _reserved: *mut c_void) -> jint {
    init_logging();
    info!(
        "llama_jni {} loaded, channel '{}'",
        env!("CARGO_PKG_VERSION"),
        crate::channel::CHANNEL
    );
    JNI_VERSION_1_6
}
