#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for completion calls.
pub const TRACING_TARGET_CLIENT: &str = "causa_completion::client";

/// Tracing target for the HTTP exchange.
pub const TRACING_TARGET_TRANSPORT: &str = "causa_completion::transport";

mod client;
mod config;
mod error;
mod failure;
mod health;
mod recovery;
mod request;
mod response;
mod shape;

pub mod prompt;
pub mod transport;
pub mod wire;

pub use client::{CompletionClient, JSON_ONLY_INSTRUCTION};
pub use config::{ApiKey, CompletionConfig};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use failure::{CompletionFailure, MalformedReason};
pub use health::{ServiceHealth, ServiceStatus};
pub use recovery::{BraceSpan, FencedBlock, JsonRecovery, extract_json_span};
pub use request::{CompletionRequest, CompletionRequestBuilder, CompletionRequestBuilderError};
pub use response::{CompletionResult, StructuredCompletion, TypedCompletion};
pub use shape::{ExpectedShape, RequiredKey, ShapeMismatch, ValueKind};
pub use wire::{ResponseFormat, TokenUsage};
