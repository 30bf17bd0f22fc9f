//! Global state management for JNI bridge
//!
//! The JVM sees one native module per process, so the loaded model lives in a
//! process-wide `NativeBridge` guarded by a mutex.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, OnceLock, PoisonError};

use jni::objects::JString;
use jni::sys::jstring;
use jni::JNIEnv;
use log::error;

use crate::bridge::NativeBridge;
use crate::config::EngineConfig;
use crate::engine::LlamaEngine;

pub type GlobalBridge = NativeBridge<LlamaEngine>;

/// Global bridge, created with the environment's config on first use
pub static BRIDGE: OnceLock<Mutex<GlobalBridge>> = OnceLock::new();

/// Run `f` with exclusive access to the global bridge.
///
/// A panic inside `f` is caught and reported as `None` so it never unwinds
/// into the JVM. A lock poisoned by an earlier panic is reused as is.
pub fn with_bridge<T>(name: &str, f: impl FnOnce(&mut GlobalBridge) -> T) -> Option<T> {
    let bridge = BRIDGE.get_or_init(|| Mutex::new(NativeBridge::new(EngineConfig::from_env())));
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut guard = bridge.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }));
    match result {
        Ok(value) => Some(value),
        Err(_) => {
            error!("{} panicked in native code", name);
            None
        }
    }
}

/// Read a Java string argument
pub fn read_jstring(env: &mut JNIEnv, value: &JString) -> anyhow::Result<String> {
    if value.is_null() {
        anyhow::bail!("argument is null");
    }
    Ok(env.get_string(value)?.into())
}

/// Create a Java string, or null if the JVM refuses
pub fn to_jstring(env: &mut JNIEnv, value: &str) -> jstring {
    match env.new_string(value) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            error!("Failed to create JString: {}", e);
            std::ptr::null_mut()
        }
    }
}
