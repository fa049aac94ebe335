// stream.rs
//
// Copyright 2026 Stéphane Cerveau <scerveau@igalia.com>
//
// This file is part of jsonrpc-peer
//
// SPDX-License-Identifier: GPL-3.0-only

//! Newline-framed adapters over arbitrary byte readers/writers (stdio,
//! pipes, TCP).

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, warn};

use super::{message_channel, ChannelRx, ChannelTx};

/// Inbound channel splitting the reader on newlines, one message per line.
///
/// Blank lines are skipped (an empty message is the end-of-stream
/// sentinel). EOF or a read error delivers the sentinel and closes.
pub fn reader_channel<R>(reader: R) -> ChannelRx
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = message_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line.is_empty() {
                        continue;
                    }
                    if tx.send(line.into_bytes()).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    let _ = tx.send(Vec::new()).await;
                    break;
                }
                Err(e) => {
                    warn!("read error on line channel: {}", e);
                    let _ = tx.send(Vec::new()).await;
                    break;
                }
            }
        }
    });
    rx
}

/// Outbound channel writing one newline-terminated message per send.
///
/// The sentinel closes the writer.
pub fn writer_channel<W>(writer: W) -> ChannelTx
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = message_channel();
    tokio::spawn(async move {
        let mut writer = BufWriter::new(writer);
        while let Some(message) = rx.recv().await {
            if message.is_empty() {
                debug!("line writer closing");
                break;
            }
            if writer.write_all(&message).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
        let _ = writer.shutdown().await;
    });
    tx
}
