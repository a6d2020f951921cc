//! WebSocket endpoint for live queue updates.
//!
//! Connections land in the `public` room and receive no queue events until
//! they identify as admin or subscribe to the requests feed. Each queue event
//! is sent once per connection that has joined `admins` or `requests`, even
//! when it is in both.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use crate::AppState;

const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Rooms a connection can join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Room {
    Public,
    Admins,
    Requests,
}

impl Room {
    fn as_str(&self) -> &'static str {
        match self {
            Room::Public => "public",
            Room::Admins => "admins",
            Room::Requests => "requests",
        }
    }
}

/// Incoming client message envelope. Unknown events are ignored.
#[derive(Debug, Deserialize)]
struct ClientMessage {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut events = state.notifier.subscribe();
    info!(
        active = state.notifier.client_count(),
        "WebSocket connection opened"
    );

    let mut rooms: HashSet<Room> = HashSet::from([Room::Public]);
    let mut ping = tokio::time::interval(PING_INTERVAL);
    ping.tick().await; // the first tick completes immediately

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let Some(Ok(message)) = incoming else { break };
                match message {
                    Message::Text(text) => {
                        if let Some(reply) = handle_client_message(&text, &mut rooms) {
                            if socket.send(Message::Text(reply)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Message::Close(_) => break,
                    Message::Ping(_) | Message::Pong(_) | Message::Binary(_) => {}
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if !receives_queue_events(&rooms) {
                            continue;
                        }
                        match serde_json::to_string(&event) {
                            Ok(payload) => {
                                if socket.send(Message::Text(payload)).await.is_err() {
                                    break;
                                }
                            }
                            Err(err) => debug!("Failed to encode queue event: {err}"),
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        debug!(missed, "WebSocket client lagged behind the event stream");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            _ = ping.tick() => {
                if socket.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    drop(events);
    info!(
        active = state.notifier.client_count(),
        "WebSocket connection closed"
    );
}

/// Apply one client message to the connection's room set, producing an
/// acknowledgement when the protocol calls for one.
fn handle_client_message(text: &str, rooms: &mut HashSet<Room>) -> Option<String> {
    let message: ClientMessage = serde_json::from_str(text).ok()?;
    match message.event.as_str() {
        "identify" => {
            let role = message.data.get("role").and_then(|r| r.as_str());
            let room = if role == Some("admin") {
                Room::Admins
            } else {
                Room::Public
            };
            rooms.insert(room);
            Some(ack("identify:ack", room))
        }
        "subscribe:requests" => {
            rooms.insert(Room::Requests);
            Some(ack("subscribe:ack", Room::Requests))
        }
        "ping:client" => {
            Some(json!({ "event": "pong:server", "data": { "at": Utc::now() } }).to_string())
        }
        _ => None,
    }
}

fn ack(event: &str, room: Room) -> String {
    json!({ "event": event, "data": { "room": room.as_str() } }).to_string()
}

/// Queue events reach connections in `admins` or `requests`.
fn receives_queue_events(rooms: &HashSet<Room>) -> bool {
    rooms.contains(&Room::Admins) || rooms.contains(&Room::Requests)
}
