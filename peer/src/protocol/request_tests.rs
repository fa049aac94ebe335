// request_tests.rs
//
// Copyright 2021 Stéphane Cerveau <scerveau@igalia.com>
//
// This file is part of jsonrpc-peer
//
// SPDX-License-Identifier: GPL-3.0-only

use serde_json::json;

use super::params::{Param, Parameters};
use super::request::{Request, RequestKind};

#[test]
fn test_request_serialize_includes_id() {
    let request = Request::new_request("echo", "123", None);
    let json = serde_json::to_string(&request).unwrap();

    assert!(json.contains(r#""jsonrpc":"2.0""#));
    assert!(json.contains(r#""method":"echo""#));
    assert!(json.contains(r#""id":"123""#));
}

#[test]
fn test_notification_omits_id() {
    let notification = Request::new_notification("ping", None);
    let json = serde_json::to_string(&notification).unwrap();

    assert!(!json.contains(r#""id""#));
    assert!(json.contains(r#""method":"ping""#));
}

#[test]
fn test_empty_params_omitted_on_wire() {
    let request = Request::new_request("echo", "123", None);
    let json = serde_json::to_string(&request).unwrap();

    assert!(!json.contains(r#""params""#));
}

#[test]
fn test_populated_params_serialized() {
    let mut param = Param::string("text", None, true);
    param.set_data(json!("hi")).unwrap();
    let request = Request::new_request("echo", "123", Some(Parameters::by_name(vec![param])));
    let json = serde_json::to_string(&request).unwrap();

    assert!(json.contains(r#""params":{"text":"hi"}"#));
}

#[test]
fn test_empty_id_gets_fresh_uuid() {
    let request = Request::new_request("echo", "", None);

    assert_eq!(request.kind(), RequestKind::Request);
    assert!(!request.id().is_empty());
    assert!(uuid::Uuid::parse_str(request.id()).is_ok());
}

#[test]
fn test_decode_with_id_is_request() {
    let json = r#"{"jsonrpc":"2.0","method":"echo","id":"123"}"#;
    let request: Request = serde_json::from_str(json).unwrap();

    assert_eq!(request.kind(), RequestKind::Request);
    assert_eq!(request.id(), "123");
    assert_eq!(request.method(), "echo");
    assert!(request.params().is_none());
}

#[test]
fn test_decode_without_id_is_notification() {
    let json = r#"{"jsonrpc":"2.0","method":"ping"}"#;
    let request: Request = serde_json::from_str(json).unwrap();

    assert!(request.is_notification());
    assert_eq!(request.id(), "");
}

#[test]
fn test_decode_empty_id_is_notification() {
    let json = r#"{"jsonrpc":"2.0","method":"ping","id":""}"#;
    let request: Request = serde_json::from_str(json).unwrap();

    assert!(request.is_notification());
}

#[test]
fn test_decode_null_id_is_notification() {
    let json = r#"{"jsonrpc":"2.0","method":"ping","id":null}"#;
    let request: Request = serde_json::from_str(json).unwrap();

    assert!(request.is_notification());
}

#[test]
fn test_decode_missing_method_fails() {
    let json = r#"{"jsonrpc":"2.0","id":"123"}"#;
    let result: Result<Request, _> = serde_json::from_str(json);

    assert!(result.is_err());
}

#[test]
fn test_decode_records_foreign_version() {
    // A wrong jsonrpc value is not a parse error: the dispatcher needs the
    // id to answer InvalidRequest
    let json = r#"{"jsonrpc":"1.0","method":"echo","id":"123"}"#;
    let request: Request = serde_json::from_str(json).unwrap();

    assert_eq!(request.rpc_version(), "1.0");
    assert_eq!(request.id(), "123");
}

#[test]
fn test_decode_positional_params() {
    let json = r#"{"jsonrpc":"2.0","method":"add","params":[3,4],"id":"123"}"#;
    let request: Request = serde_json::from_str(json).unwrap();

    let params = request.params().unwrap();
    assert!(matches!(params, Parameters::ByPosition(_)));
    assert_eq!(params.len(), 2);
}

#[test]
fn test_id_round_trip() {
    let request = Request::new_request("echo", "abc-42", None);
    let bytes = request.to_vec().unwrap();
    let decoded = Request::from_slice(&bytes).unwrap();

    assert_eq!(decoded.id(), "abc-42");
    assert_eq!(decoded.kind(), RequestKind::Request);
    assert_eq!(decoded.method(), "echo");
}
