//! Token-by-token generation loop, independent of the inference backend.

use log::{debug, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::sampling::{select_token, RecentTokens};
use crate::text::{find_stop_word, sanitize_utf8};

/// A decoding session that has already consumed the prompt.
pub trait TokenSource {
    /// Logits for the most recently decoded position, one per vocabulary entry.
    fn logits(&self) -> &[f32];

    /// Whether `token` ends generation (EOS, EOT and friends).
    fn is_eog(&self, token: i32) -> bool;

    /// Raw bytes of `token`; may hold part of a multi-byte character.
    fn piece(&self, token: i32) -> Result<Vec<u8>>;

    /// Feed `token` back at the next position.
    fn advance(&mut self, token: i32) -> Result<()>;
}

/// Run greedy generation on `source` and return the sanitized text.
///
/// `prompt_tokens` seed the repetition window. Stops on an end-of-generation
/// token, on a stop word (the output is cut right before it), after
/// `n_predict` tokens, or when decoding the next token fails.
pub fn run<S: TokenSource>(
    source: &mut S,
    prompt_tokens: &[i32],
    config: &EngineConfig,
) -> String {
    let mut recent = RecentTokens::new(config.repeat_window);
    recent.extend(prompt_tokens.iter().copied());

    let mut output: Vec<u8> = Vec::new();
    for step in 0..config.n_predict {
        let mut logits = source.logits().to_vec();
        if logits.is_empty() {
            break;
        }
        let token = select_token(&mut logits, &recent, config.repeat_penalty);

        if source.is_eog(token) {
            debug!("End of generation after {} tokens", step);
            break;
        }

        match source.piece(token).map(until_nul) {
            Ok(bytes) if !bytes.is_empty() => {
                output.extend_from_slice(&bytes);
                if let Some(pos) = find_stop_word(&output, &config.stop_words) {
                    output.truncate(pos);
                    debug!("Stop word hit after {} tokens", step + 1);
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => debug!("Skipping undecodable token {}: {}", token, e),
        }

        recent.push(token);

        if let Err(e) = source.advance(token) {
            warn!("Stopping generation: {}", e);
            break;
        }
    }

    sanitize_utf8(&output)
}

/// A piece ends at its first NUL byte, like a C string.
fn until_nul(mut bytes: Vec<u8>) -> Vec<u8> {
    if let Some(end) = bytes.iter().position(|&b| b == 0) {
        bytes.truncate(end);
    }
    bytes
}
