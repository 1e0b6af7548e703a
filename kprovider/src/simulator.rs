//! Offline stand-in for the chat backend.
//!
//! Replies are picked from a fixed set of templates that embed the model name
//! and the user's text. Streaming splits a reply on single spaces and yields
//! one word at a time, re-inserting the separator after every word but the
//! last, so concatenating the chunks reproduces the reply exactly.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use kprovider::{FixedRandom, ResponseSimulator};
//!
//! let simulator = ResponseSimulator::new(Arc::new(FixedRandom(1)));
//! let reply = simulator.generate("tides", "mistral:7b");
//! assert!(reply.contains("\"tides\"") && reply.contains("mistral:7b"));
//! ```

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures_core::Stream;
use futures_timer::Delay;

pub type ChunkStream<'a> = Pin<Box<dyn Stream<Item = String> + Send + 'a>>;

pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_millis(50);

/// Source of template indices. Injected so tests can pin the outcome.
pub trait RandomSource: Send + Sync {
    /// Returns a value in `0..upper`. `upper` is never zero.
    fn next_index(&self, upper: usize) -> usize;
}

/// Operating-system randomness via `getrandom`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn next_index(&self, upper: usize) -> usize {
        let mut bytes = [0_u8; 8];
        if let Err(err) = getrandom::fill(&mut bytes) {
            tracing::debug!(error = %err, "system randomness unavailable; using first template");
            return 0;
        }
        (u64::from_le_bytes(bytes) % upper as u64) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRandom(pub usize);

impl RandomSource for FixedRandom {
    fn next_index(&self, upper: usize) -> usize {
        self.0 % upper
    }
}

#[derive(Clone)]
pub struct ResponseSimulator {
    random: Arc<dyn RandomSource>,
    chunk_delay: Duration,
}

impl Default for ResponseSimulator {
    fn default() -> Self {
        Self::new(Arc::new(SystemRandom))
    }
}

impl ResponseSimulator {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self {
            random,
            chunk_delay: DEFAULT_CHUNK_DELAY,
        }
    }

    pub fn with_chunk_delay(mut self, chunk_delay: Duration) -> Self {
        self.chunk_delay = chunk_delay;
        self
    }

    pub fn chunk_delay(&self) -> Duration {
        self.chunk_delay
    }

    pub fn generate(&self, user_text: &str, model: &str) -> String {
        let templates = templates(user_text, model);
        let index = self.random.next_index(templates.len());
        templates
            .into_iter()
            .nth(index)
            .unwrap_or_default()
    }

    pub fn stream_generate(&self, user_text: &str, model: &str) -> ChunkStream<'static> {
        self.stream_text(self.generate(user_text, model))
    }

    /// Streams `text` word by word, waiting `chunk_delay` before each chunk.
    pub fn stream_text(&self, text: String) -> ChunkStream<'static> {
        let delay = self.chunk_delay;
        let chunks = split_into_chunks(&text);

        Box::pin(stream! {
            for chunk in chunks {
                if !delay.is_zero() {
                    Delay::new(delay).await;
                }
                yield chunk;
            }
        })
    }
}

fn templates(user_text: &str, model: &str) -> [String; 4] {
    [
        format!(
            "Hello! I'm {model}, and I'm here to help you with your question: \"{user_text}\". How can I assist you further?"
        ),
        format!(
            "That's an interesting question about \"{user_text}\". As {model}, I can provide insights on this topic."
        ),
        format!(
            "Thank you for your message: \"{user_text}\". I'm {model} and I'm ready to help you explore this topic in detail."
        ),
        format!(
            "I understand you're asking about \"{user_text}\". Let me share some thoughts on this as {model}."
        ),
    ]
}

pub fn split_into_chunks(text: &str) -> Vec<String> {
    let words = text.split(' ').collect::<Vec<_>>();
    let last = words.len().saturating_sub(1);

    words
        .into_iter()
        .enumerate()
        .map(|(index, word)| {
            if index < last {
                format!("{word} ")
            } else {
                word.to_string()
            }
        })
        .collect()
}
