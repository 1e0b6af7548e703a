#[cfg(feature = "provider-ollama")]
pub mod ollama;
