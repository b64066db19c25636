//! Error types for audito operations.
//!
//! This module defines the main error type [`AuditoError`] which represents
//! all possible errors that can occur while fetching pages, walking
//! pagination, synthesizing audio, and writing the assembled file.

use thiserror::Error;

/// Main error type for the article-to-audio pipeline.
///
/// The pagination walker treats [`AuditoError::NoArticle`] and fetch-related
/// variants as fatal only for the first page; on continuation pages they stop
/// the walk and the partial article is kept. Synthesis errors are always
/// fatal for the whole run.
#[derive(Error, Debug)]
pub enum AuditoError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other transport-level problems.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Non-200 response status on a page fetch.
    #[error("Unexpected status {status} fetching {url}")]
    BadStatus { url: String, status: u16 },

    /// Invalid URL provided.
    ///
    /// Returned when a URL cannot be parsed or is malformed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No readable article could be extracted from the page.
    #[error("No article could be extracted: {0}")]
    NoArticle(String),

    /// A segment's synthesis request failed or returned an unexpected
    /// content type. Fatal for the whole synthesis run.
    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    /// Assembling the per-segment audio buffers failed, typically because
    /// an expected segment index is missing from the result map.
    #[error("Audio assembly failed: {0}")]
    Assembly(String),

    /// File write errors.
    ///
    /// Wraps standard I/O errors for writing the audio artifact.
    #[error("Failed to write audio file: {0}")]
    WriteError(#[from] std::io::Error),
}

/// Result type alias for AuditoError.
///
/// This is a convenience alias for `std::result::Result<T, AuditoError>`.
pub type Result<T> = std::result::Result<T, AuditoError>;
