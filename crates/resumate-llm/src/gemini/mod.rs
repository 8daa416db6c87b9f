mod client;

pub use client::{GeminiClient, GEMINI_API_BASE};
