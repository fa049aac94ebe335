// main.rs
//
// Copyright 2026 Stéphane Cerveau <scerveau@igalia.com>
//
// This file is part of jsonrpc-peer
//
// SPDX-License-Identifier: GPL-3.0-only

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;

use jsonrpc_peer::channel::websocket_channels;
use jsonrpc_peer::protocol::Parameters;
use jsonrpc_peer::RpcPeer;

fn print_help() {
    println!("\nAvailable commands:");
    println!("  call <method> [params]   - Call a method and wait for the response");
    println!("  notify <method> [params] - Send a notification (no response)");
    println!("  help                     - Show this help");
    println!("  quit                     - Exit");
    println!("\nParams are a JSON array (by position) or object (by name), e.g.:");
    println!("  call echo {{\"text\":\"hi\"}}");
    println!("  call add [3,4]");
    println!();
}

enum InputEvent {
    Line(String),
    Quit,
    Error(String),
}

fn parse_params(input: &str) -> Result<Option<Parameters>, serde_json::Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Parameters>(trimmed).map(Some)
}

fn run_command(peer: &RpcPeer, line: &str) {
    let mut parts = line.splitn(3, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let method = parts.next().unwrap_or_default().to_string();
    let rest = parts.next().unwrap_or_default();

    match command {
        "call" if !method.is_empty() => {
            let params = match parse_params(rest) {
                Ok(params) => params,
                Err(e) => {
                    println!("Invalid params: {}", e);
                    return;
                }
            };
            let peer = peer.clone();
            tokio::spawn(async move {
                match peer.call_method(None, &method, params).await {
                    Ok(result) => println!(
                        "\n[RESPONSE] {}: {}",
                        method,
                        serde_json::to_string_pretty(&result).unwrap_or_default()
                    ),
                    Err(e) => println!("\n[ERROR] {}: {} (code: {})", method, e.message, e.code),
                }
            });
        }
        "notify" if !method.is_empty() => {
            let params = match parse_params(rest) {
                Ok(params) => params,
                Err(e) => {
                    println!("Invalid params: {}", e);
                    return;
                }
            };
            let peer = peer.clone();
            tokio::spawn(async move {
                peer.notify_method(None, &method, params).await;
            });
        }
        "help" => print_help(),
        _ => {
            println!("Unknown command or missing arguments. Type 'help' for available commands.");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:9000".to_string());

    println!("Connecting to {}...", url);

    let (ws_stream, _) = connect_async(&url).await?;
    println!("Connected!");

    let peer = RpcPeer::new();
    let (chan_in, chan_out) = websocket_channels(ws_stream);
    peer.add_channels(chan_in, chan_out).await;
    peer.on_disconnect(|_channel_id| {
        println!("\nConnection closed");
    })
    .await;

    // Channel for sending commands from readline thread to async task
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<InputEvent>();

    // Spawn readline in a separate thread (rustyline is synchronous)
    let readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                let _ = cmd_tx.send(InputEvent::Error(format!("Failed to create editor: {}", e)));
                return;
            }
        };

        loop {
            match rl.readline("> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        let _ = rl.add_history_entry(trimmed);
                    }
                    if trimmed == "quit" || trimmed == "exit" {
                        let _ = cmd_tx.send(InputEvent::Quit);
                        break;
                    }
                    if cmd_tx.send(InputEvent::Line(line)).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    let _ = cmd_tx.send(InputEvent::Quit);
                    break;
                }
                Err(ReadlineError::Eof) => {
                    let _ = cmd_tx.send(InputEvent::Quit);
                    break;
                }
                Err(e) => {
                    let _ = cmd_tx.send(InputEvent::Error(format!("Readline error: {}", e)));
                    break;
                }
            }
        }
    });

    print_help();

    // Main command loop
    loop {
        tokio::select! {
            Some(event) = cmd_rx.recv() => {
                match event {
                    InputEvent::Line(line) => {
                        let trimmed = line.trim();
                        if !trimmed.is_empty() {
                            run_command(&peer, trimmed);
                        }
                    }
                    InputEvent::Quit => {
                        break;
                    }
                    InputEvent::Error(e) => {
                        eprintln!("{}", e);
                        break;
                    }
                }
            }
            else => {
                break;
            }
        }
    }

    peer.remove_channels(None).await;
    let _ = readline_handle.join();
    println!("Goodbye!");
    Ok(())
}
