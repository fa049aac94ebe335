// response.rs
//
// Copyright 2021 Stéphane Cerveau <scerveau@igalia.com>
//
// This file is part of jsonrpc-peer
//
// SPDX-License-Identifier: GPL-3.0-only

//! Success- and Error-variant responses.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::protocol::{RpcError, JSONRPC_VERSION};

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Success(Value),
    Error(RpcError),
}

/// A JSON-RPC 2.0 Response.
///
/// Exactly one of `result` or `error` appears on the wire; the body enum
/// makes the other combinations unrepresentable. An empty id encodes as
/// JSON `null` (used when replying to an unparseable request).
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    id: String,
    jsonrpc: String,
    body: ResponseBody,
}

#[derive(Serialize, Deserialize)]
struct WireResponse {
    #[serde(default)]
    jsonrpc: String,
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

impl Response {
    pub fn new_success(id: impl Into<String>, result: Value) -> Self {
        Self {
            id: id.into(),
            jsonrpc: JSONRPC_VERSION.to_string(),
            body: ResponseBody::Success(result),
        }
    }

    pub fn new_error(id: impl Into<String>, error: RpcError) -> Self {
        Self {
            id: id.into(),
            jsonrpc: JSONRPC_VERSION.to_string(),
            body: ResponseBody::Error(error),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rpc_version(&self) -> &str {
        &self.jsonrpc
    }

    pub fn is_error(&self) -> bool {
        matches!(self.body, ResponseBody::Error(_))
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Success(result) => Some(result),
            ResponseBody::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&RpcError> {
        match &self.body {
            ResponseBody::Success(_) => None,
            ResponseBody::Error(error) => Some(error),
        }
    }

    pub fn into_result(self) -> Result<Value, RpcError> {
        match self.body {
            ResponseBody::Success(result) => Ok(result),
            ResponseBody::Error(error) => Err(error),
        }
    }

    pub fn from_slice(data: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn to_vec(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl Serialize for Response {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let (result, error) = match &self.body {
            ResponseBody::Success(result) => (Some(result.clone()), None),
            ResponseBody::Error(error) => (None, Some(error.clone())),
        };
        let wire = WireResponse {
            jsonrpc: self.jsonrpc.clone(),
            // null when the request id never made it out of the envelope
            id: if self.id.is_empty() {
                None
            } else {
                Some(self.id.clone())
            },
            result,
            error,
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Response {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = WireResponse::deserialize(deserializer)?;

        // The variant is determined before jsonrpc is looked at so a
        // partially-broken envelope still routes to the right downstream
        // path. An error body wins over a result body.
        let body = if let Some(error) = wire.error {
            ResponseBody::Error(error)
        } else if let Some(result) = wire.result {
            ResponseBody::Success(result)
        } else {
            return Err(D::Error::custom("no error or result"));
        };

        Ok(Self {
            id: wire.id.unwrap_or_default(),
            jsonrpc: wire.jsonrpc,
            body,
        })
    }
}
