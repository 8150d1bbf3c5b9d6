/*!
 * Error enums shared by the locale reader, the providers and the pipeline.
 *
 * Library code returns these typed errors; the controller and the binary
 * wrap them in `anyhow` with file context.
 */

use thiserror::Error;

/// Failure talking to an LLM backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Body could not be decoded into the expected shape
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Non-success status that is neither auth nor throttling
    #[error("API responded with error: {status_code} - {message}")]
    ApiError { status_code: u16, message: String },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// HTTP 429
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// HTTP 401 or 403
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether a transport-level retry could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }

    /// Map an HTTP status and body to the matching variant
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Raised while reading a locale file
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocaleError {
    /// TypeScript syntax error, or a file without the literal-object shape
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A non-empty file produced no translatable strings
    #[error("No key/value string literals found in {0}")]
    NoStrings(String),
}

/// Fatal outcomes of a whole-file translation
#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Locale error: {0}")]
    Locale(#[from] LocaleError),

    /// Strict mode only; the output has already been written
    #[error("{0} strings still fail placeholder or translation checks")]
    Unresolved(usize),
}
