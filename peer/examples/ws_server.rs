// ws_server.rs
//
// Copyright 2026 Stéphane Cerveau <scerveau@igalia.com>
//
// This file is part of jsonrpc-peer
//
// SPDX-License-Identifier: GPL-3.0-only

//! Demo host: accepts WebSocket connections and serves each one with the
//! same peer. Try it together with the REPL client:
//!
//! ```text
//! cargo run --example ws_server
//! cargo run -p jsonrpc-peer-client
//! ```

use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use jsonrpc_peer::channel::websocket_channels;
use jsonrpc_peer::protocol::Param;
use jsonrpc_peer::RpcPeer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("jsonrpc_peer=debug".parse().unwrap()),
        )
        .init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:9000".to_string());

    let peer = RpcPeer::new();
    peer.register_method(
        "echo",
        vec![Param::string("text", None, true)],
        |params| async move { Ok(json!(params["text"].as_string()?)) },
    )
    .await;
    peer.register_method(
        "add",
        vec![Param::int("a", None, true), Param::int("b", None, true)],
        |params| async move { Ok(json!(params["a"].as_int()? + params["b"].as_int()?)) },
    )
    .await;
    peer.on_disconnect(|channel_id| info!("channel {} disconnected", channel_id))
        .await;

    let listener = TcpListener::bind(&addr).await?;
    info!("listening on ws://{}", addr);

    loop {
        match listener.accept().await {
            Ok((stream, remote)) => {
                info!("connection from {}", remote);
                let peer = peer.clone();
                tokio::spawn(async move {
                    match tokio_tungstenite::accept_async(stream).await {
                        Ok(ws_stream) => {
                            let (chan_in, chan_out) = websocket_channels(ws_stream);
                            peer.use_channels(chan_in, chan_out).await;
                            info!("connection from {} closed", remote);
                        }
                        Err(e) => {
                            error!("WebSocket handshake failed for {}: {}", remote, e);
                        }
                    }
                });
            }
            Err(e) => {
                error!("failed to accept connection: {}", e);
            }
        }
    }
}
