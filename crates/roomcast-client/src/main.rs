//! Interactive terminal client.
//!
//! Sends one `join` envelope, stores the issued token, then relays stdin
//! lines as `message` envelopes. Inbound `system` and `error` envelopes
//! are display-only.

use std::process;
use std::time::Duration;

use chrono::{Local, Utc};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing_subscriber::{fmt, EnvFilter};

use roomcast_core::protocol::Envelope;

#[derive(Debug, Parser)]
#[command(name = "roomcast-client", about = "roomcast terminal client")]
struct Args {
    /// WebSocket server URL.
    #[arg(long, default_value = "ws://localhost:28080/ws")]
    server: String,

    /// Room identifier.
    #[arg(long, default_value = "1234564")]
    room: String,

    /// Display name (required).
    #[arg(long)]
    name: String,

    /// Connection timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let name = args.name.trim().to_string();
    if name.is_empty() {
        eprintln!("--name must not be blank");
        process::exit(2);
    }

    let connect = tokio::time::timeout(
        Duration::from_secs(args.timeout_secs),
        connect_async(&args.server),
    )
    .await;
    let (socket, _response) = match connect {
        Ok(Ok(pair)) => pair,
        Ok(Err(e)) => {
            tracing::error!(url = %args.server, err = %e, "dial failed");
            process::exit(1);
        }
        Err(_) => {
            tracing::error!(url = %args.server, "dial timed out");
            process::exit(1);
        }
    };

    let (mut ws_tx, mut ws_rx) = socket.split();

    let join = Envelope::Join {
        room: args.room.clone(),
        name: name.clone(),
    };
    let payload = join.encode().expect("encode join");
    if let Err(e) = ws_tx.send(Message::Text(payload.into())).await {
        tracing::error!(err = %e, "send join failed");
        process::exit(1);
    }
    tracing::info!(room = %args.room, name = %name, "sent join");

    // The token arrives asynchronously; the input loop reads the latest
    // issued value from this slot.
    let (token_tx, token_rx) = watch::channel(None::<String>);

    let mut reader = tokio::spawn(async move {
        while let Some(frame) = ws_rx.next().await {
            let msg = match frame {
                Ok(m) => m,
                Err(e) => {
                    tracing::error!(err = %e, "read error");
                    return;
                }
            };
            match msg {
                Message::Text(raw) => match Envelope::decode(raw.as_str()) {
                    Ok(env) => print_envelope(env, &token_tx),
                    Err(e) => tracing::warn!(err = %e, "bad envelope from server"),
                },
                Message::Close(_) => {
                    tracing::info!("server closed connection");
                    return;
                }
                // Pings are answered by the transport layer.
                _ => {}
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Type messages and press Enter to send. Ctrl+C to exit.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = &mut reader => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let body = line.trim();
                    if body.is_empty() {
                        continue;
                    }
                    let token = token_rx.borrow().clone();
                    let Some(token) = token else {
                        eprintln!("token not yet issued by server");
                        continue;
                    };
                    let env = Envelope::Message {
                        token: Some(token),
                        body: body.to_string(),
                        sender: None,
                        timestamp: None,
                    };
                    let payload = env.encode().expect("encode message");
                    if let Err(e) = ws_tx.send(Message::Text(payload.into())).await {
                        eprintln!("send error: {e}");
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    eprintln!("input error: {e}");
                    break;
                }
            },
        }
    }

    reader.abort();
    tracing::info!("shutting down client");
}

fn print_envelope(env: Envelope, token_tx: &watch::Sender<Option<String>>) {
    match env {
        Envelope::Token { token, .. } => {
            if token.is_empty() {
                tracing::warn!("token envelope missing token");
                return;
            }
            println!("[system] issued token {token}");
            let _ = token_tx.send(Some(token));
        }
        Envelope::System { sender, body } => println!("[{sender}] {body}"),
        Envelope::Message {
            sender,
            body,
            timestamp,
            ..
        } => {
            let sender = sender.unwrap_or_else(|| "?".into());
            let at = timestamp.unwrap_or_else(Utc::now).with_timezone(&Local);
            println!("[{sender}][{}] {body}", at.format("%I:%M%p"));
        }
        Envelope::Error { error } => eprintln!("[error] {error}"),
        Envelope::Join { .. } => tracing::warn!("unexpected join envelope from server"),
    }
}
