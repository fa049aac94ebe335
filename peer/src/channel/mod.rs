// mod.rs
//
// Copyright 2021 Stéphane Cerveau <scerveau@igalia.com>
//
// This file is part of jsonrpc-peer
//
// SPDX-License-Identifier: GPL-3.0-only

//! Framed byte-message channels and the adapters that produce them.
//!
//! A channel endpoint carries one complete JSON value per message. The empty
//! message is the end-of-stream sentinel: inbound it announces that the
//! source is gone, outbound it closes the sink. The peer runtime never
//! learns which adapter produced a given channel.

use tokio::sync::mpsc;

pub mod stream;
pub mod websocket;


pub use stream::{reader_channel, writer_channel};
pub use websocket::websocket_channels;

/// Bound of every framed-message queue
pub const MESSAGE_BUFFER: usize = 256;

/// Outbound half of a framed byte-message channel
pub type ChannelTx = mpsc::Sender<Vec<u8>>;
/// Inbound half of a framed byte-message channel
pub type ChannelRx = mpsc::Receiver<Vec<u8>>;

/// A single bounded message queue, used directly for in-process peers.
pub fn message_channel() -> (ChannelTx, ChannelRx) {
    mpsc::channel(MESSAGE_BUFFER)
}

/// Two crossed queues forming an in-process bidirectional link.
///
/// Returns `(a, b)` where everything sent on `a`'s tx arrives on `b`'s rx
/// and vice versa.
pub fn pair() -> ((ChannelTx, ChannelRx), (ChannelTx, ChannelRx)) {
    let (a_tx, b_rx) = message_channel();
    let (b_tx, a_rx) = message_channel();
    ((a_tx, a_rx), (b_tx, b_rx))
}
