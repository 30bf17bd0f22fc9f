use serde_json::json;

use super::{Call, RecordingBridge};
use crate::channel::{handle_message, MethodCall, MethodResult, BAD_MESSAGE, INVALID_ARGUMENT};

fn roundtrip(bridge: &mut RecordingBridge, message: &str) -> MethodResult {
    let reply = handle_message(bridge, message).unwrap();
    MethodResult::decode_envelope(reply.as_deref()).unwrap()
}

#[test]
fn raw_load_model_message() {
    let mut bridge = RecordingBridge::new(true, "");
    let reply = handle_message(
        &mut bridge,
        r#"{"method":"loadModel","args":{"path":"/data/model.gguf"}}"#,
    )
    .unwrap();

    assert_eq!(reply.as_deref(), Some("[true]"));
    assert_eq!(bridge.calls, vec![Call::Load("/data/model.gguf".to_string())]);
}

#[test]
fn raw_generate_message_keeps_unicode() {
    let mut bridge = RecordingBridge::new(true, "안녕하세요");
    let message = MethodCall::new("generate", json!({"prompt": "인사해줘"}))
        .encode()
        .unwrap();

    assert_eq!(roundtrip(&mut bridge, &message), MethodResult::success("안녕하세요"));
    assert_eq!(bridge.calls, vec![Call::Generate("인사해줘".to_string())]);
}

#[test]
fn raw_unload_without_args() {
    let mut bridge = RecordingBridge::new(true, "");
    let reply = handle_message(&mut bridge, r#"{"method":"unload"}"#).unwrap();

    assert_eq!(reply.as_deref(), Some("[null]"));
    assert_eq!(bridge.calls, vec![Call::Unload]);
}

#[test]
fn raw_unknown_method_gets_empty_reply() {
    let mut bridge = RecordingBridge::new(true, "");
    let reply = handle_message(&mut bridge, r#"{"method":"stream","args":null}"#).unwrap();

    assert_eq!(reply, None);
    assert!(bridge.calls.is_empty());
}

#[test]
fn raw_missing_argument_gets_error_envelope() {
    let mut bridge = RecordingBridge::new(true, "");
    match roundtrip(&mut bridge, r#"{"method":"generate","args":{}}"#) {
        MethodResult::Error { code, message, .. } => {
            assert_eq!(code, INVALID_ARGUMENT);
            assert!(message.unwrap().contains("prompt"));
        }
        other => panic!("unexpected reply {:?}", other),
    }
}

#[test]
fn malformed_message_gets_error_envelope() {
    let mut bridge = RecordingBridge::new(true, "");
    match roundtrip(&mut bridge, "{not json") {
        MethodResult::Error { code, .. } => assert_eq!(code, BAD_MESSAGE),
        other => panic!("unexpected reply {:?}", other),
    }
    assert!(bridge.calls.is_empty());
}
