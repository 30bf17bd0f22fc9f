mod message;

use crate::bridge::ModelBridge;

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Load(String),
    Generate(String),
    Unload,
}

/// Records every call and answers with canned values.
pub(crate) struct RecordingBridge {
    pub calls: Vec<Call>,
    pub load_result: bool,
    pub generate_result: String,
}

impl RecordingBridge {
    pub fn new(load_result: bool, generate_result: &str) -> Self {
        Self {
            calls: Vec::new(),
            load_result,
            generate_result: generate_result.to_string(),
        }
    }
}

impl ModelBridge for RecordingBridge {
    fn load_model(&mut self, path: &str) -> bool {
        self.calls.push(Call::Load(path.to_string()));
        self.load_result
    }

    fn generate(&mut self, prompt: &str) -> String {
        self.calls.push(Call::Generate(prompt.to_string()));
        self.generate_result.clone()
    }

    fn unload(&mut self) {
        self.calls.push(Call::Unload);
    }
}
