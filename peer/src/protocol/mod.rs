// mod.rs
//
// Copyright 2021 Stéphane Cerveau <scerveau@igalia.com>
//
// This file is part of jsonrpc-peer
//
// SPDX-License-Identifier: GPL-3.0-only

//! JSON-RPC 2.0 protocol types.
//!
//! This module contains the error catalog, the typed parameter model and the
//! Request/Response envelopes. The envelopes enforce the JSON-RPC 2.0 wire
//! rules (variant inference by `id` presence, exactly one of `result` or
//! `error`); routing lives in the `peer` module.

use serde::{Deserialize, Serialize};

pub mod params;
pub mod request;
pub mod response;

pub use params::{Param, Parameters};
pub use request::{Request, RequestKind};
pub use response::Response;

#[cfg(test)]
mod request_tests;
#[cfg(test)]
mod response_tests;

/// JSON-RPC 2.0 standard error codes
pub mod error_codes {
    /// Parse error - Invalid JSON was received
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - The JSON sent is not a valid Request object
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found - The method does not exist / is not available
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params - Invalid method parameter(s)
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error - Internal JSON-RPC error
    pub const INTERNAL_ERROR: i32 = -32603;

    // Server error codes (reserved for implementation-defined server errors)
    // Range: -32000 to -32099

    /// Generic server-defined error
    pub const SERVER_ERROR: i32 = -32000;
}

/// JSON-RPC 2.0 version string
pub const JSONRPC_VERSION: &str = "2.0";

/// Error object carried in the `error` field of a Response.
///
/// These are the only error shapes that ever appear on the wire; host-facing
/// API failures use `crate::PeerError` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Invalid JSON was received
    pub fn parse_error() -> Self {
        Self::new(error_codes::PARSE_ERROR, "Parse error")
    }

    /// The JSON sent is not a valid Request object
    pub fn invalid_request() -> Self {
        Self::new(error_codes::INVALID_REQUEST, "Invalid Request")
    }

    /// The method does not exist / is not available
    pub fn method_not_found() -> Self {
        Self::new(error_codes::METHOD_NOT_FOUND, "Method not found")
    }

    /// Invalid method parameter(s)
    pub fn invalid_params() -> Self {
        Self::new(error_codes::INVALID_PARAMS, "Invalid params")
    }

    /// Internal JSON-RPC error
    pub fn internal_error() -> Self {
        Self::new(error_codes::INTERNAL_ERROR, "Internal error")
    }

    /// Server-defined error with a custom message
    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::SERVER_ERROR, message)
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)
    }
}

impl std::error::Error for RpcError {}
