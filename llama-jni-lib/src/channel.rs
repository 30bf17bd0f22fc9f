//! Method-channel dispatch for the `kanana_llm` channel.
//!
//! Messages use the JSON method codec layout:
//!
//! - call: `{"method": "generate", "args": {"prompt": "..."}}`
//! - success reply: `[result]`
//! - error reply: `[code, message, details]`
//! - not implemented: empty reply

use std::fmt;

use log::{debug, warn};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::bridge::ModelBridge;
use crate::error::Result;

/// Channel name shared with the UI layer.
pub const CHANNEL: &str = "kanana_llm";

pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
pub const BAD_MESSAGE: &str = "BAD_MESSAGE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMethod {
    LoadModel,
    Generate,
    Unload,
}

impl ChannelMethod {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "loadModel" => Some(Self::LoadModel),
            "generate" => Some(Self::Generate),
            "unload" => Some(Self::Unload),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::LoadModel => "loadModel",
            Self::Generate => "generate",
            Self::Unload => "unload",
        }
    }
}

impl fmt::Display for ChannelMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named invocation with its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub args: Value,
}

impl MethodCall {
    pub fn new<S: Into<String>>(method: S, args: Value) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }

    /// Named argument from an object-shaped `args`; `None` when absent or of
    /// another type.
    pub fn argument<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.args
            .get(key)
            .and_then(|value| T::deserialize(value).ok())
    }

    pub fn decode(message: &str) -> Result<Self> {
        Ok(serde_json::from_str(message)?)
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Reply to a [`MethodCall`].
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResult {
    Success(Value),
    Error {
        code: String,
        message: Option<String>,
        details: Value,
    },
    NotImplemented,
}

impl MethodResult {
    pub fn success<T: Into<Value>>(value: T) -> Self {
        Self::Success(value.into())
    }

    pub fn error<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self::Error {
            code: code.into(),
            message: Some(message.into()),
            details: Value::Null,
        }
    }

    /// Encoded reply; `None` stands for the empty not-implemented reply.
    pub fn encode_envelope(&self) -> Result<Option<String>> {
        let envelope = match self {
            Self::Success(value) => json!([value]),
            Self::Error {
                code,
                message,
                details,
            } => json!([code, message, details]),
            Self::NotImplemented => return Ok(None),
        };
        Ok(Some(serde_json::to_string(&envelope)?))
    }

    pub fn decode_envelope(reply: Option<&str>) -> Result<Self> {
        let reply = match reply {
            Some(reply) if !reply.trim().is_empty() => reply,
            _ => return Ok(Self::NotImplemented),
        };
        let envelope: Vec<Value> = serde_json::from_str(reply)?;
        let mut parts = envelope.into_iter();
        match (parts.next(), parts.next(), parts.next(), parts.len()) {
            (Some(value), None, None, 0) => Ok(Self::Success(value)),
            (Some(Value::String(code)), Some(message), Some(details), _) => Ok(Self::Error {
                code,
                message: match message {
                    Value::Null => None,
                    Value::String(message) => Some(message),
                    other => Some(other.to_string()),
                },
                details,
            }),
            _ => Err(serde_json::Error::custom("malformed reply envelope").into()),
        }
    }
}

/// Route one call to `bridge` and wrap its return value.
///
/// Unknown methods, and calls missing their argument, never reach the bridge.
pub fn dispatch<B: ModelBridge + ?Sized>(bridge: &mut B, call: &MethodCall) -> MethodResult {
    let method = match ChannelMethod::from_name(&call.method) {
        Some(method) => method,
        None => {
            warn!("Unknown method: {}", call.method);
            return MethodResult::NotImplemented;
        }
    };
    debug!("Dispatching {} on {}", method, CHANNEL);

    match method {
        ChannelMethod::LoadModel => match call.argument::<String>("path") {
            Some(path) => MethodResult::success(bridge.load_model(&path)),
            None => missing_argument(method, "path"),
        },
        ChannelMethod::Generate => match call.argument::<String>("prompt") {
            Some(prompt) => MethodResult::success(bridge.generate(&prompt)),
            None => missing_argument(method, "prompt"),
        },
        ChannelMethod::Unload => {
            bridge.unload();
            MethodResult::Success(Value::Null)
        }
    }
}

/// Decode a raw call, dispatch it and encode the reply.
pub fn handle_message<B: ModelBridge + ?Sized>(
    bridge: &mut B,
    message: &str,
) -> Result<Option<String>> {
    let reply = match MethodCall::decode(message) {
        Ok(call) => dispatch(bridge, &call),
        Err(e) => {
            warn!("Rejecting malformed method call: {}", e);
            MethodResult::error(BAD_MESSAGE, e.to_string())
        }
    };
    reply.encode_envelope()
}

fn missing_argument(method: ChannelMethod, name: &str) -> MethodResult {
    warn!("{} called without string argument '{}'", method, name);
    MethodResult::error(
        INVALID_ARGUMENT,
        format!("{} requires a string argument '{}'", method, name),
    )
}
