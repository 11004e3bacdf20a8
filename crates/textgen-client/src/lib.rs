//! `textgen-client`: blocking client for text-generation model endpoints.
//!
//! # Architecture
//!
//! ```text
//! GenerationRequest        ← system instruction + ordered conversation turns
//!     │
//!     ▼
//! TextGenerator::generate  ← HttpTextGenerator POSTs the wire body
//!     │                       with connect/request timeouts
//!     ▼
//! ResponseBody             ← structured message parts, or flat outputText
//!     │
//!     ▼
//! String                   ← plain text handed back to the caller
//! ```
//!
//! Anything that is not one of the two known response shapes is reported as
//! [`TextGenError::Unparseable`]; callers decide how to recover.

pub mod client;
pub mod error;
pub mod types;


pub use client::{extract_text, ClientConfig, HttpTextGenerator, TextGenerator};
pub use error::TextGenError;
pub use types::{GenerationRequest, ResponseBody, Role, Turn};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, TextGenError>;
