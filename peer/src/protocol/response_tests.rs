// response_tests.rs
//
// Copyright 2021 Stéphane Cerveau <scerveau@igalia.com>
//
// This file is part of jsonrpc-peer
//
// SPDX-License-Identifier: GPL-3.0-only

use serde_json::json;

use super::response::Response;
use super::{error_codes, RpcError};

#[test]
fn test_success_serialization() {
    let response = Response::new_success("123", json!("hi"));
    let json = serde_json::to_string(&response).unwrap();

    assert!(json.contains(r#""result":"hi""#));
    assert!(json.contains(r#""id":"123""#));
    assert!(!json.contains(r#""error""#));
}

#[test]
fn test_error_serialization() {
    let response = Response::new_error("123", RpcError::method_not_found());
    let json = serde_json::to_string(&response).unwrap();

    assert!(json.contains(r#""code":-32601"#));
    assert!(json.contains(r#""message":"Method not found""#));
    assert!(!json.contains(r#""result""#));
}

#[test]
fn test_empty_id_encodes_as_null() {
    let response = Response::new_error("", RpcError::parse_error());
    let json = serde_json::to_string(&response).unwrap();

    assert!(json.contains(r#""id":null"#));
}

#[test]
fn test_decode_success() {
    let json = r#"{"jsonrpc":"2.0","id":"123","result":7}"#;
    let response: Response = serde_json::from_str(json).unwrap();

    assert!(!response.is_error());
    assert_eq!(response.result(), Some(&json!(7)));
    assert_eq!(response.id(), "123");
}

#[test]
fn test_decode_error() {
    let json = r#"{"jsonrpc":"2.0","id":"123","error":{"code":-32602,"message":"Invalid params"}}"#;
    let response: Response = serde_json::from_str(json).unwrap();

    assert!(response.is_error());
    let error = response.error().unwrap();
    assert_eq!(error.code, error_codes::INVALID_PARAMS);
}

#[test]
fn test_decode_error_wins_over_result() {
    let json = r#"{"jsonrpc":"2.0","id":"1","result":7,"error":{"code":-32000,"message":"boom"}}"#;
    let response: Response = serde_json::from_str(json).unwrap();

    assert!(response.is_error());
}

#[test]
fn test_decode_without_result_or_error_fails() {
    let json = r#"{"jsonrpc":"2.0","id":"123"}"#;
    let result: Result<Response, _> = serde_json::from_str(json);

    assert!(result.is_err());
}

#[test]
fn test_decode_null_id() {
    let json = r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32700,"message":"Parse error"}}"#;
    let response: Response = serde_json::from_str(json).unwrap();

    assert_eq!(response.id(), "");
}

#[test]
fn test_decode_records_version_after_variant() {
    // The variant is usable even when the version is wrong, so the
    // dispatcher can answer the protocol violation
    let json = r#"{"jsonrpc":"1.0","id":"123","result":7}"#;
    let response: Response = serde_json::from_str(json).unwrap();

    assert_eq!(response.rpc_version(), "1.0");
    assert!(!response.is_error());
}

#[test]
fn test_into_result() {
    let value = Response::new_success("1", json!({"ok":true}))
        .into_result()
        .unwrap();
    assert_eq!(value, json!({"ok":true}));

    let error = Response::new_error("1", RpcError::server_error("boom"))
        .into_result()
        .unwrap_err();
    assert_eq!(error.code, error_codes::SERVER_ERROR);
    assert_eq!(error.message, "boom");
}

#[test]
fn test_round_trip() {
    let response = Response::new_error("42", RpcError::invalid_request());
    let bytes = response.to_vec().unwrap();
    let decoded = Response::from_slice(&bytes).unwrap();

    assert_eq!(decoded, response);
}
