// websocket.rs
//
// Copyright 2026 Stéphane Cerveau <scerveau@igalia.com>
//
// This file is part of jsonrpc-peer
//
// SPDX-License-Identifier: GPL-3.0-only

//! WebSocket adapter: one text frame per framed message.

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, warn};

use super::{message_channel, ChannelRx, ChannelTx};

/// Turn an established WebSocket into a framed channel pair.
///
/// Inbound text and binary frames become messages; a Close frame or a
/// transport error delivers the sentinel and ends the pump. Outbound, the
/// sentinel sends a Close frame and exits.
pub fn websocket_channels<S>(ws_stream: WebSocketStream<S>) -> (ChannelRx, ChannelTx)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let (in_tx, in_rx) = message_channel();
    tokio::spawn(async move {
        while let Some(frame) = ws_receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    if in_tx.send(text.as_bytes().to_vec()).await.is_err() {
                        return;
                    }
                }
                Ok(Message::Binary(data)) => {
                    if in_tx.send(data.to_vec()).await.is_err() {
                        return;
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("websocket closed by remote");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("websocket receive error: {}", e);
                    break;
                }
            }
        }
        let _ = in_tx.send(Vec::new()).await;
    });

    let (out_tx, mut out_rx) = message_channel();
    tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            if message.is_empty() {
                let _ = ws_sender.send(Message::Close(None)).await;
                break;
            }
            match String::from_utf8(message) {
                Ok(text) => {
                    if ws_sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("dropping non-utf8 outbound message: {}", e);
                }
            }
        }
    });

    (in_rx, out_tx)
}
