//! Method-channel handler for JNI bridge
//!
//! Lets the activity hand a whole `kanana_llm` channel message to native code
//! instead of switching on the method name in Java.

use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;
use log::error;
use std::ptr;

use super::types::*;
use crate::channel::{self, MethodResult, BAD_MESSAGE};

/// JNI: Handle a JSON method call
///
/// Java signature:
/// public static native String handleMethodCall(String message);
///
/// Returns the JSON reply envelope, or null when the method is not implemented.
#[no_mangle]
pub extern "C" fn Java_com_example_kanana_1llm_1app_LlamaBridge_handleMethodCall(
    mut env: JNIEnv,
    _class: JClass,
    message_jstr: JString,
) -> jstring {
    let reply = match read_jstring(&mut env, &message_jstr) {
        Ok(message) => with_bridge("handleMethodCall", |bridge| {
            channel::handle_message(bridge, &message)
        })
        .unwrap_or_else(|| {
            MethodResult::error(BAD_MESSAGE, "native handler panicked").encode_envelope()
        }),
        Err(e) => {
            error!("Failed to get method call: {:#}", e);
            MethodResult::error(BAD_MESSAGE, format!("{:#}", e)).encode_envelope()
        }
    };

    match reply {
        Ok(Some(envelope)) => to_jstring(&mut env, &envelope),
        Ok(None) => ptr::null_mut(),
        Err(e) => {
            error!("Failed to encode reply: {}", e);
            ptr::null_mut()
        }
    }
}
