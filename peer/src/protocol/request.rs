// request.rs
//
// Copyright 2021 Stéphane Cerveau <scerveau@igalia.com>
//
// This file is part of jsonrpc-peer
//
// SPDX-License-Identifier: GPL-3.0-only

//! Request and Notification envelopes sharing the JSON-RPC 2.0 wire form.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::protocol::{Parameters, JSONRPC_VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Carries an id and expects a Response
    Request,
    /// Carries no id and never receives a reply
    Notification,
}

/// A JSON-RPC 2.0 Request or Notification.
///
/// The two variants share the wire form; the only difference is the `id`
/// field, which a Notification omits. A decoded envelope whose `id` is
/// absent, null or empty classifies as a Notification.
#[derive(Debug, Clone)]
pub struct Request {
    kind: RequestKind,
    id: String,
    jsonrpc: String,
    method: String,
    params: Option<Parameters>,
}

#[derive(Serialize, Deserialize)]
struct WireRequest {
    #[serde(default)]
    jsonrpc: String,
    method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    params: Option<Parameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

impl Request {
    /// New Request. An empty `id` is replaced with a fresh v4 UUID so an
    /// empty-string id never reaches the wire.
    pub fn new_request(method: impl Into<String>, id: impl Into<String>, params: Option<Parameters>) -> Self {
        let id = id.into();
        let id = if id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            id
        };

        Self {
            kind: RequestKind::Request,
            id,
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params: Some(params.unwrap_or_else(|| Parameters::by_name(Vec::new()))),
        }
    }

    pub fn new_notification(method: impl Into<String>, params: Option<Parameters>) -> Self {
        Self {
            kind: RequestKind::Notification,
            id: String::new(),
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params: Some(params.unwrap_or_else(|| Parameters::by_name(Vec::new()))),
        }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn is_notification(&self) -> bool {
        self.kind == RequestKind::Notification
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rpc_version(&self) -> &str {
        &self.jsonrpc
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> Option<&Parameters> {
        self.params.as_ref()
    }

    pub fn from_slice(data: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn to_vec(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl Serialize for Request {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let wire = WireRequest {
            jsonrpc: self.jsonrpc.clone(),
            method: self.method.clone(),
            // Omitted when empty so the receiver can tell "no params" apart
            // from "empty params" by key presence
            params: self.params.clone().filter(|params| !params.is_empty()),
            id: match self.kind {
                RequestKind::Request => Some(self.id.clone()),
                RequestKind::Notification => None,
            },
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Request {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = WireRequest::deserialize(deserializer)?;
        let (kind, id) = match wire.id {
            Some(id) if !id.is_empty() => (RequestKind::Request, id),
            _ => (RequestKind::Notification, String::new()),
        };

        Ok(Self {
            kind,
            id,
            jsonrpc: wire.jsonrpc,
            method: wire.method,
            params: wire.params,
        })
    }
}
