//! `LlamaBridge` native methods
//!
//! Java side:
//!
//! ```java
//! public static native boolean loadModel(String path);
//! public static native String generate(String prompt);
//! public static native void unload();
//! ```

use jni::objects::{JClass, JString};
use jni::sys::{jboolean, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use log::error;

use super::types::*;
use crate::bridge::ModelBridge;

/// JNI: Load a model file; `false` on any failure
#[no_mangle]
pub extern "C" fn Java_com_example_kanana_1llm_1app_LlamaBridge_loadModel(
    mut env: JNIEnv,
    _class: JClass,
    path_jstr: JString,
) -> jboolean {
    let path = match read_jstring(&mut env, &path_jstr) {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to get model path: {:#}", e);
            return JNI_FALSE;
        }
    };

    match with_bridge("loadModel", |bridge| bridge.load_model(&path)) {
        Some(true) => JNI_TRUE,
        _ => JNI_FALSE,
    }
}

/// JNI: Generate text for a prompt
///
/// Errors come back as text starting with "Error: ".
#[no_mangle]
pub extern "C" fn Java_com_example_kanana_1llm_1app_LlamaBridge_generate(
    mut env: JNIEnv,
    _class: JClass,
    prompt_jstr: JString,
) -> jstring {
    let output = match read_jstring(&mut env, &prompt_jstr) {
        Ok(prompt) => with_bridge("generate", |bridge| bridge.generate(&prompt))
            .unwrap_or_else(|| "Error: generation aborted".to_string()),
        Err(e) => {
            error!("Failed to get prompt: {:#}", e);
            format!("Error: {:#}", e)
        }
    };

    to_jstring(&mut env, &output)
}

/// JNI: Release the loaded model
#[no_mangle]
pub extern "C" fn Java_com_example_kanana_1llm_1app_LlamaBridge_unload(
    _env: JNIEnv,
    _class: JClass,
) {
    with_bridge("unload", |bridge| bridge.unload());
}
