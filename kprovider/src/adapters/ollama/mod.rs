//! Ollama backend: model listing, whole-reply chat, and NDJSON streaming chat.

mod ndjson;
mod provider;
mod serde_api;
mod transport;

pub use ndjson::{NdjsonDecoder, decode_line};
pub use provider::{OLLAMA_HOST_URL, OllamaProvider};
pub use transport::{OllamaByteStream, OllamaHttpTransport, OllamaTransport};
