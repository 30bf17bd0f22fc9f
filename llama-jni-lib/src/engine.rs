use std::num::NonZeroU32;
use std::sync::OnceLock;

use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::context::LlamaContext;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel};
use llama_cpp_2::token::LlamaToken;
use log::{debug, error, info};

use crate::bridge::InferenceBackend;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::generation::{self, TokenSource};

/// Global llama.cpp backend. llama.cpp allows a single init per process, so it
/// stays alive after the last model is unloaded.
static LLAMA_BACKEND: OnceLock<std::result::Result<LlamaBackend, String>> = OnceLock::new();

fn backend() -> Result<&'static LlamaBackend> {
    let result = LLAMA_BACKEND.get_or_init(|| LlamaBackend::init().map_err(|e| e.to_string()));
    match result {
        Ok(backend) => Ok(backend),
        Err(e) => Err(Error::model_load(format!(
            "failed to initialize llama.cpp backend: {}",
            e
        ))),
    }
}

/// A GGUF model loaded through llama.cpp.
///
/// Every `generate` call runs in a fresh context, so nothing from a previous
/// prompt leaks into the next one.
pub struct LlamaEngine {
    model: LlamaModel,
    config: EngineConfig,
}

impl LlamaEngine {
    fn context_params(&self) -> LlamaContextParams {
        LlamaContextParams::default()
            .with_n_ctx(NonZeroU32::new(self.config.n_ctx))
            .with_n_batch(self.config.n_ctx)
            .with_n_threads(self.config.n_threads)
            .with_n_threads_batch(self.config.n_threads_batch)
    }

    fn new_context(&self) -> Result<LlamaContext<'_>> {
        self.model
            .new_context(backend()?, self.context_params())
            .map_err(Error::context)
    }
}

impl InferenceBackend for LlamaEngine {
    fn load(path: &str, config: &EngineConfig) -> Result<Self> {
        debug!("Start loading model from {}", path);
        config.validate()?;

        // llama.cpp maps the file by default
        let model_params = LlamaModelParams::default();
        let model = LlamaModel::load_from_file(backend()?, path, &model_params).map_err(|e| {
            error!("Failed to load model: {}", e);
            Error::model_load(e)
        })?;

        let engine = Self {
            model,
            config: config.clone(),
        };

        // Make sure a context of the configured size fits before reporting success.
        if let Err(e) = engine.new_context() {
            error!("Failed to create context: {}", e);
            return Err(e);
        }

        info!("Model load complete: {}", path);
        Ok(engine)
    }

    fn generate(&mut self, prompt: &str) -> Result<String> {
        let mut ctx = self.new_context()?;

        let tokens = self
            .model
            .str_to_token(prompt, AddBos::Always)
            .map_err(Error::tokenize)?;
        if tokens.is_empty() {
            return Err(Error::tokenize("prompt produced no tokens"));
        }
        debug!("Prompt tokenized into {} tokens", tokens.len());

        let mut batch = LlamaBatch::new(tokens.len(), 1);
        let last_index = tokens.len() as i32 - 1;
        for (i, token) in (0_i32..).zip(tokens.iter().copied()) {
            batch
                .add(token, i, &[0], i == last_index)
                .map_err(Error::decode)?;
        }
        ctx.decode(&mut batch).map_err(Error::decode)?;

        let prompt_ids: Vec<i32> = tokens.iter().map(|t| t.0).collect();
        let mut session = Session {
            model: &self.model,
            ctx,
            batch,
            n_past: last_index + 1,
            piece_buffer: self.config.piece_buffer,
        };

        Ok(generation::run(&mut session, &prompt_ids, &self.config))
    }
}

struct Session<'a> {
    model: &'a LlamaModel,
    ctx: LlamaContext<'a>,
    batch: LlamaBatch,
    n_past: i32,
    piece_buffer: usize,
}

impl TokenSource for Session<'_> {
    fn logits(&self) -> &[f32] {
        self.ctx.get_logits_ith(self.batch.n_tokens() - 1)
    }

    fn is_eog(&self, token: i32) -> bool {
        self.model.is_eog_token(LlamaToken::new(token))
    }

    fn piece(&self, token: i32) -> Result<Vec<u8>> {
        self.model
            .token_to_piece_bytes(LlamaToken::new(token), self.piece_buffer, true, None)
            .map_err(Error::decode)
    }

    fn advance(&mut self, token: i32) -> Result<()> {
        self.batch.clear();
        self.batch
            .add(LlamaToken::new(token), self.n_past, &[0], true)
            .map_err(Error::decode)?;
        self.ctx.decode(&mut self.batch).map_err(Error::decode)?;
        self.n_past += 1;
        Ok(())
    }
}
