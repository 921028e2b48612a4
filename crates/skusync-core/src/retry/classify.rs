//! Map store/HTTP failures onto retry error kinds.

use super::policy::ErrorKind;
use crate::store::StoreError;

/// Classify an HTTP status code for retry purposes.
pub fn classify_http_status(status: u16) -> ErrorKind {
    match status {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(status),
        _ => ErrorKind::Other,
    }
}

/// Classify a store error. 4xx responses (other than throttling) will not
/// succeed on retry; network trouble and 5xx are worth another attempt.
pub fn classify_store_error(err: &StoreError) -> ErrorKind {
    match err {
        StoreError::Request(e) => {
            if e.is_timeout() {
                ErrorKind::Timeout
            } else if e.is_connect() {
                ErrorKind::Connection
            } else {
                ErrorKind::Other
            }
        }
        StoreError::Status { status, .. } => classify_http_status(*status),
        StoreError::Decode(_) | StoreError::Auth(_) => ErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttling_statuses() {
        assert_eq!(classify_http_status(429), ErrorKind::Throttled);
        assert_eq!(classify_http_status(503), ErrorKind::Throttled);
    }

    #[test]
    fn server_errors_are_retryable() {
        assert_eq!(classify_http_status(500), ErrorKind::Http5xx(500));
        assert_eq!(classify_http_status(502), ErrorKind::Http5xx(502));
    }

    #[test]
    fn client_errors_are_not_retried() {
        assert_eq!(classify_http_status(400), ErrorKind::Other);
        assert_eq!(classify_http_status(404), ErrorKind::Other);
    }

    #[test]
    fn status_store_error_uses_http_classification() {
        let err = StoreError::Status {
            status: 503,
            message: "backend unavailable".to_string(),
        };
        assert_eq!(classify_store_error(&err), ErrorKind::Throttled);
        let err = StoreError::Decode("missing field".to_string());
        assert_eq!(classify_store_error(&err), ErrorKind::Other);
    }
}
