//! Hosted generation model access

pub mod client;

pub use client::{GenerationClient, OllamaGenerateClient};
