use crate::client::{LlmClient, truncate};
use crate::error::LlmError;

#[test]
fn test_truncate_within_limit() {
    assert_eq!(truncate("hello", 10), "hello");
}

#[test]
fn test_truncate_at_limit() {
    assert_eq!(truncate("hello", 5), "hello");
}

#[test]
fn test_truncate_exceeds_limit() {
    assert_eq!(truncate("hello world", 5), "hello");
}

#[test]
fn test_truncate_unicode_boundary() {
    let s = "привет";
    let result = truncate(s, 4);
    assert!(result.len() <= 4);
}

#[test]
fn test_truncate_empty() {
    assert_eq!(truncate("", 10), "");
}

#[test]
fn test_base_url_trailing_slash_trimmed() {
    let client = LlmClient::new("k".to_owned(), "http://localhost:8080/v1/".to_owned()).unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080/v1");
}

#[test]
fn test_debug_hides_api_key() {
    let client = LlmClient::new("secret-key".to_owned(), "http://localhost".to_owned()).unwrap();
    let debug = format!("{client:?}");
    assert!(!debug.contains("secret-key"));
}

#[test]
fn test_retryable_classification() {
    assert!(LlmError::Status { status: 429, body: String::new() }.is_retryable());
    assert!(LlmError::Status { status: 503, body: String::new() }.is_retryable());
    assert!(LlmError::Status { status: 504, body: String::new() }.is_retryable());
    assert!(!LlmError::Status { status: 400, body: String::new() }.is_retryable());
    assert!(!LlmError::Status { status: 401, body: String::new() }.is_retryable());
    assert!(!LlmError::NoReply.is_retryable());
}

#[test]
fn test_error_messages_name_the_model_api() {
    let err = LlmError::Status { status: 401, body: "Unauthorized".to_owned() };
    assert_eq!(err.to_string(), "model API answered with status 401: Unauthorized");
    let err = LlmError::NoModel { family: "gemini".to_owned() };
    assert_eq!(err.to_string(), "no 'gemini' model is offered by the API");
}
