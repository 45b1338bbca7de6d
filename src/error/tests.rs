//! Tests for the error type

use super::*;
use std::io;

#[test]
fn test_error_type_display() {
    assert_eq!(format!("{}", ErrorType::Io), "IO");
    assert_eq!(format!("{}", ErrorType::Parse), "Parse");
    assert_eq!(format!("{}", ErrorType::Settings), "Settings");
    assert_eq!(format!("{}", ErrorType::Range), "Range");
}

#[test]
fn test_rift_error_constructors() {
    let err = RiftError::new(ErrorType::Io, "E001", "test msg");
    assert_eq!(err.kind, ErrorType::Io);
    assert_eq!(err.code, "E001");
    assert_eq!(err.message, "test msg");
}

#[test]
fn test_range_shorthand() {
    let err = RiftError::range(crate::constants::error_types::UNORDERED_EDIT, "overlap");
    assert_eq!(err.kind, ErrorType::Range);
    assert_eq!(err.code, "UNORDERED_EDIT");
    assert!(err.contains_msg("overl"));
    assert!(!err.contains_msg("missing"));
}

#[test]
fn test_rift_error_display() {
    let err = RiftError::new(ErrorType::Range, "RANGE_OUT_OF_BOUNDS", "past end");
    assert_eq!(err.to_string(), "Range(RANGE_OUT_OF_BOUNDS): past end");
}

#[test]
fn test_from_io_error() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: RiftError = io_err.into();
    assert_eq!(err.kind, ErrorType::Io);
    assert_eq!(err.code, "IO_ERROR");
    assert!(err.contains_msg("file not found"));
}

#[test]
fn test_from_json_error() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: RiftError = json_err.into();
    assert_eq!(err.kind, ErrorType::Parse);
    assert_eq!(err.code, "CONFIG_PARSE");
}
