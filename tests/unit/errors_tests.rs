/*!
 * Tests for error types
 */

use langpack::errors::{ExtractionError, LocaleError, ProviderError, TranslationError};

#[test]
fn test_from_status_shouldMapAuthAndRateLimit() {
    assert!(matches!(
        ProviderError::from_status(401, "no key".into()),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(429, "slow".into()),
        ProviderError::RateLimitExceeded(_)
    ));
    assert!(matches!(
        ProviderError::from_status(500, "boom".into()),
        ProviderError::ApiError { status_code: 500, .. }
    ));
}

#[test]
fn test_is_retryable_shouldOnlyAcceptTransientErrors() {
    assert!(ProviderError::ConnectionError("reset".into()).is_retryable());
    assert!(ProviderError::from_status(429, "slow".into()).is_retryable());
    assert!(ProviderError::from_status(502, "bad gateway".into()).is_retryable());
    assert!(!ProviderError::from_status(404, "missing".into()).is_retryable());
    assert!(!ProviderError::AuthenticationError("bad key".into()).is_retryable());
    assert!(!ProviderError::ParseError("garbage".into()).is_retryable());
}

#[test]
fn test_locale_error_display_shouldIncludePosition() {
    let error = LocaleError::Syntax {
        line: 3,
        column: 7,
        message: "expected `:`".to_string(),
    };
    assert_eq!(error.to_string(), "Syntax error at line 3, column 7: expected `:`");
}

#[test]
fn test_translation_error_shouldWrapSources() {
    let error: TranslationError = ExtractionError::NoStrings("src/en/index.ts".into()).into();
    assert_eq!(
        error.to_string(),
        "Extraction error: No key/value string literals found in src/en/index.ts"
    );

    let error: TranslationError = ProviderError::ConnectionError("refused".into()).into();
    assert!(matches!(error, TranslationError::Provider(_)));

    let error: TranslationError = LocaleError::Syntax {
        line: 2,
        column: 11,
        message: "Unterminated string constant".to_string(),
    }
    .into();
    assert!(error.to_string().starts_with("Locale error: Syntax error at line 2, column 11"));
}
