// error.rs
//
// Copyright 2026 Stéphane Cerveau <scerveau@igalia.com>
//
// This file is part of jsonrpc-peer
//
// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PeerError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid parameter key: {0}")]
    InvalidParameterKey(String),
}

pub type Result<T> = std::result::Result<T, PeerError>;
