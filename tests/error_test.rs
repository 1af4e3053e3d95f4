use std::time::Duration;

use mimir::{Category, ErrorKind, MimirError, Result};

#[test]
fn test_error_display() {
    let err = MimirError::Unresolved {
        category: Category::Skill,
        name: "db-migrations".to_string(),
    };
    assert!(err.to_string().contains("db-migrations"));
    assert!(err.to_string().contains("skill"));
}

#[test]
fn test_validation_display() {
    let err = MimirError::Validation("goal must not be empty".into());
    assert_eq!(err.to_string(), "invalid request: goal must not be empty");
}

#[test]
fn test_result_alias() {
    fn returns_error() -> Result<()> {
        Err(MimirError::EmptyResponse)
    }
    assert!(returns_error().is_err());
}

#[test]
fn test_json_error_converts() {
    fn parse() -> Result<serde_json::Value> {
        Ok(serde_json::from_str("{not json")?)
    }
    let err = parse().unwrap_err();
    assert!(matches!(err, MimirError::Json(_)));
    assert_eq!(err.kind(), ErrorKind::Internal);
}

// ============================================================================
// Transient error classification
// ============================================================================

#[test]
fn transient_errors() {
    assert!(MimirError::RateLimited { retry_after: None }.is_transient());
    assert!(MimirError::Http("connection reset".into()).is_transient());
    assert!(MimirError::Timeout(Duration::from_secs(30)).is_transient());
    for status in [500, 502, 503, 529] {
        assert!(
            MimirError::Api {
                status,
                message: "server".into()
            }
            .is_transient(),
            "status {status}"
        );
    }
}

#[test]
fn fatal_errors() {
    assert!(!MimirError::AuthenticationFailed.is_transient());
    assert!(!MimirError::MalformedRequest("bad".into()).is_transient());
    assert!(!MimirError::EmptyResponse.is_transient());
    for status in [400, 404, 409, 422] {
        let err = MimirError::Api {
            status,
            message: "client".into(),
        };
        assert!(!err.is_transient(), "status {status}");
        assert_eq!(err.kind(), ErrorKind::FatalService);
    }
}

#[test]
fn non_service_errors_are_not_transient() {
    assert!(!MimirError::Validation("x".into()).is_transient());
    assert!(!MimirError::TaskPanicked("item".into()).is_transient());
    assert!(!MimirError::CacheWrite("disk full".into()).is_transient());
    assert!(!MimirError::Configuration("bad".into()).is_transient());
}

#[test]
fn error_kinds() {
    assert_eq!(MimirError::Validation("x".into()).kind(), ErrorKind::Validation);
    assert_eq!(
        MimirError::Timeout(Duration::ZERO).kind(),
        ErrorKind::TransientService
    );
    assert_eq!(
        MimirError::Unresolved {
            category: Category::Agent,
            name: "x".into()
        }
        .kind(),
        ErrorKind::FatalService
    );
    assert_eq!(MimirError::CacheRead("x".into()).kind(), ErrorKind::CacheWrite);
    assert_eq!(MimirError::TaskPanicked("x".into()).kind(), ErrorKind::Internal);
}

#[test]
fn retry_after_hint() {
    let hinted = MimirError::RateLimited {
        retry_after: Some(Duration::from_secs(7)),
    };
    assert_eq!(hinted.retry_after(), Some(Duration::from_secs(7)));
    assert_eq!(MimirError::RateLimited { retry_after: None }.retry_after(), None);
    assert_eq!(MimirError::Http("reset".into()).retry_after(), None);
}

// ============================================================================
// Aggregate batch errors
// ============================================================================

#[test]
fn aggregate_display_with_systemic_hint() {
    let err = MimirError::AggregateBatch {
        category: Category::Agent,
        failed: 5,
        total: 10,
        dominant_kind: Some(ErrorKind::FatalService),
        summary: "a: authentication failed; b: authentication failed".into(),
    };
    let msg = err.to_string();
    assert!(msg.starts_with("agent batch failed: 5 of 10 items failed"), "{msg}");
    assert!(msg.contains("(all fatal service errors, likely systemic)"), "{msg}");
    assert!(msg.ends_with("a: authentication failed; b: authentication failed"));
    assert_eq!(err.kind(), ErrorKind::AggregateBatch);
    assert!(!err.is_transient());
}

#[test]
fn aggregate_display_without_dominant_kind() {
    let err = MimirError::AggregateBatch {
        category: Category::Skill,
        failed: 2,
        total: 3,
        dominant_kind: None,
        summary: "x: empty response from model".into(),
    };
    assert_eq!(
        err.to_string(),
        "skill batch failed: 2 of 3 items failed; x: empty response from model"
    );
}
