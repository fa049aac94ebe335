// lib.rs
//
// Copyright 2021 Stéphane Cerveau <scerveau@igalia.com>
//
// This file is part of jsonrpc-peer
//
// SPDX-License-Identifier: GPL-3.0-only

pub mod channel;
pub mod error;
pub mod peer;
pub mod protocol;

pub use error::{PeerError, Result};
pub use peer::RpcPeer;
pub use protocol::{Param, Parameters, Request, Response, RpcError};
