//! Discord Gateway Client
//!
//! Keeps one websocket session alive and forwards the events the bot cares
//! about over an mpsc channel:
//! 1. Hello -> Identify (intents + presence)
//! 2. Heartbeat loop, first beat jittered, missed ACK = zombie connection
//! 3. Dispatch: READY and MESSAGE_CREATE
//!
//! Any drop, op 7 or op 9 starts a fresh session (no resume) after an
//! exponential backoff. Authentication and intent close codes are fatal.

use futures_util::{Sink, SinkExt, StreamExt};
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, timeout, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use super::types::{
    GatewayEvent, GatewayPayload, Hello, Identify, MessageCreate, Ready, OP_DISPATCH,
    OP_HEARTBEAT, OP_HEARTBEAT_ACK, OP_HELLO, OP_IDENTIFY, OP_INVALID_SESSION, OP_RECONNECT,
};
use crate::models::BotConfig;

// ============================================
// GATEWAY CONSTANTS
// ============================================

/// Reconnection base delay (milliseconds)
const GATEWAY_RECONNECT_BASE_MS: u64 = 1000;

/// Maximum reconnection delay (milliseconds)
const GATEWAY_RECONNECT_MAX_MS: u64 = 30000;

/// Consecutive failed sessions before giving up
const GATEWAY_MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// How long to wait for Hello after connecting
const GATEWAY_HELLO_TIMEOUT_SECS: u64 = 10;

/// Event channel buffer
const GATEWAY_EVENT_BUFFER: usize = 256;

/// Close codes after which reconnecting cannot help:
/// 4004 auth failed, 4010 invalid shard, 4011 sharding required,
/// 4012 invalid API version, 4013 invalid intents, 4014 disallowed intents
const FATAL_CLOSE_CODES: [u16; 6] = [4004, 4010, 4011, 4012, 4013, 4014];

pub fn is_fatal_close_code(code: u16) -> bool {
    FATAL_CLOSE_CODES.contains(&code)
}

/// Delay before reconnect attempt `attempt` (1-based), doubling up to the cap
pub fn backoff_delay_ms(attempt: u32) -> u64 {
    let shift = attempt.saturating_sub(1).min(16);
    (GATEWAY_RECONNECT_BASE_MS << shift).min(GATEWAY_RECONNECT_MAX_MS)
}

/// How a single session ended
#[derive(Debug)]
enum SessionEnd {
    /// Reconnect; `established` if READY was seen
    Dropped { established: bool, reason: String },
    /// Give up for good
    Fatal(String),
    /// Event receiver is gone
    Closed,
}

// ============================================
// GATEWAY CLIENT
// ============================================

pub struct DiscordGateway {
    url: String,
    token: String,
    intents: u64,
    status_text: String,
}

impl DiscordGateway {
    pub fn new(url: &str, token: &str, intents: u64, status_text: &str) -> Self {
        Self {
            url: url.to_string(),
            token: token.to_string(),
            intents,
            status_text: status_text.to_string(),
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(
            &config.gateway_url,
            &config.discord_token,
            config.intents,
            &config.status_text,
        )
    }

    /// Start the connection task and return its event stream
    pub fn spawn(self) -> mpsc::Receiver<GatewayEvent> {
        let (tx, rx) = mpsc::channel(GATEWAY_EVENT_BUFFER);
        tokio::spawn(async move { self.run(tx).await });
        rx
    }

    /// Connection loop with reconnection logic
    pub async fn run(self, tx: mpsc::Sender<GatewayEvent>) {
        let mut reconnect_attempts = 0;

        loop {
            match self.run_session(&tx).await {
                SessionEnd::Closed => {
                    info!("📪 Receiver dropped, stopping gateway");
                    return;
                }
                SessionEnd::Fatal(reason) => {
                    error!("❌ Gateway closed permanently: {}", reason);
                    let _ = tx.send(GatewayEvent::Fatal(reason)).await;
                    return;
                }
                SessionEnd::Dropped {
                    established,
                    reason,
                } => {
                    warn!("🔌 Gateway session ended: {}", reason);
                    if established {
                        reconnect_attempts = 0;
                    }
                    if tx.send(GatewayEvent::Disconnected).await.is_err() {
                        return;
                    }
                }
            }

            reconnect_attempts += 1;
            if reconnect_attempts >= GATEWAY_MAX_RECONNECT_ATTEMPTS {
                let reason = "Max reconnection attempts reached".to_string();
                error!("❌ {}, giving up", reason);
                let _ = tx.send(GatewayEvent::Fatal(reason)).await;
                return;
            }

            let delay = backoff_delay_ms(reconnect_attempts);
            warn!(
                "🔄 Reconnecting in {}ms (attempt {}/{})",
                delay, reconnect_attempts, GATEWAY_MAX_RECONNECT_ATTEMPTS
            );
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    async fn run_session(&self, tx: &mpsc::Sender<GatewayEvent>) -> SessionEnd {
        let ws_stream = match connect_async(&self.url).await {
            Ok((stream, _)) => stream,
            Err(e) => {
                return SessionEnd::Dropped {
                    established: false,
                    reason: format!("connect failed: {}", e),
                }
            }
        };
        info!("🔌 Gateway connected");

        let (mut write, mut read) = ws_stream.split();

        // Hello carries the heartbeat interval
        let hello = match timeout(
            Duration::from_secs(GATEWAY_HELLO_TIMEOUT_SECS),
            read.next(),
        )
        .await
        {
            Ok(Some(Ok(Message::Text(text)))) => parse_payload(&text)
                .filter(|p| p.op == OP_HELLO)
                .and_then(|p| p.data::<Hello>()),
            _ => None,
        };
        let Some(hello) = hello else {
            return SessionEnd::Dropped {
                established: false,
                reason: "no Hello received".to_string(),
            };
        };

        let identify = Identify::new(&self.token, self.intents, &self.status_text);
        let identify = match serde_json::to_value(&identify) {
            Ok(d) => GatewayPayload::new(OP_IDENTIFY, d),
            Err(e) => return SessionEnd::Fatal(format!("cannot encode Identify: {}", e)),
        };
        if let Err(e) = send_payload(&mut write, &identify).await {
            return SessionEnd::Dropped {
                established: false,
                reason: format!("Identify send failed: {}", e),
            };
        }

        let period = Duration::from_millis(hello.heartbeat_interval.max(1));
        let jitter = period.mul_f64(rand::random::<f64>());
        let mut heartbeat = interval_at(Instant::now() + jitter, period);
        debug!(interval_ms = hello.heartbeat_interval, "Heartbeat scheduled");

        let mut seq: Option<u64> = None;
        let mut acked = true;
        let mut established = false;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if !acked {
                        return SessionEnd::Dropped {
                            established,
                            reason: "heartbeat not acknowledged".to_string(),
                        };
                    }
                    if let Err(e) = send_payload(&mut write, &heartbeat_payload(seq)).await {
                        return SessionEnd::Dropped {
                            established,
                            reason: format!("heartbeat send failed: {}", e),
                        };
                    }
                    acked = false;
                }
                frame = read.next() => {
                    let text = match frame {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Ping(data))) => {
                            let _ = write.send(Message::Pong(data)).await;
                            continue;
                        }
                        Some(Ok(Message::Close(close))) => {
                            let code = close.as_ref().map(|f| u16::from(f.code));
                            let reason = format!("closed by server ({:?})", code);
                            return match code {
                                Some(code) if is_fatal_close_code(code) => SessionEnd::Fatal(reason),
                                _ => SessionEnd::Dropped { established, reason },
                            };
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => {
                            return SessionEnd::Dropped {
                                established,
                                reason: format!("websocket error: {}", e),
                            }
                        }
                        None => {
                            return SessionEnd::Dropped {
                                established,
                                reason: "stream ended".to_string(),
                            }
                        }
                    };

                    let Some(payload) = parse_payload(&text) else {
                        debug!("Ignoring undecodable gateway frame");
                        continue;
                    };
                    if payload.s.is_some() {
                        seq = payload.s;
                    }

                    match payload.op {
                        OP_DISPATCH => {
                            let Some(event) = dispatch_event(&payload) else {
                                continue;
                            };
                            if matches!(event, GatewayEvent::Ready { .. }) {
                                established = true;
                            }
                            if tx.send(event).await.is_err() {
                                return SessionEnd::Closed;
                            }
                        }
                        OP_HEARTBEAT => {
                            if let Err(e) = send_payload(&mut write, &heartbeat_payload(seq)).await {
                                return SessionEnd::Dropped {
                                    established,
                                    reason: format!("heartbeat send failed: {}", e),
                                };
                            }
                        }
                        OP_HEARTBEAT_ACK => acked = true,
                        OP_RECONNECT => {
                            return SessionEnd::Dropped {
                                established,
                                reason: "server requested reconnect".to_string(),
                            }
                        }
                        OP_INVALID_SESSION => {
                            // Gateway asks for a 1-5s pause before identifying again
                            let pause = 1000 + (rand::random::<f64>() * 4000.0) as u64;
                            tokio::time::sleep(Duration::from_millis(pause)).await;
                            return SessionEnd::Dropped {
                                established,
                                reason: "invalid session".to_string(),
                            };
                        }
                        other => debug!(op = other, "Unhandled gateway opcode"),
                    }
                }
            }
        }
    }
}

// ============================================
// FRAME HELPERS
// ============================================

pub fn parse_payload(text: &str) -> Option<GatewayPayload> {
    serde_json::from_str(text).ok()
}

pub fn heartbeat_payload(seq: Option<u64>) -> GatewayPayload {
    GatewayPayload::new(OP_HEARTBEAT, serde_json::json!(seq))
}

/// Map a dispatch frame to a bot event; other dispatch types are dropped
pub fn dispatch_event(payload: &GatewayPayload) -> Option<GatewayEvent> {
    match payload.t.as_deref()? {
        "READY" => {
            let ready = payload.data::<Ready>()?;
            info!(
                "✅ Logged in as {} ({}), session {}",
                ready.user.username, ready.user.id, ready.session_id
            );
            Some(GatewayEvent::Ready {
                user_id: ready.user.id,
                username: ready.user.username,
            })
        }
        "MESSAGE_CREATE" => {
            let msg = payload.data::<MessageCreate>()?;
            Some(GatewayEvent::Message(msg.into()))
        }
        _ => None,
    }
}

async fn send_payload<S>(sink: &mut S, payload: &GatewayPayload) -> Result<(), String>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let text = serde_json::to_string(payload).map_err(|e| e.to_string())?;
    sink.send(Message::Text(text)).await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_close_codes() {
        for code in [4004, 4010, 4011, 4012, 4013, 4014] {
            assert!(is_fatal_close_code(code));
        }
        for code in [1000, 1001, 4000, 4007, 4009] {
            assert!(!is_fatal_close_code(code));
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        assert_eq!(backoff_delay_ms(1), 1000);
        assert_eq!(backoff_delay_ms(2), 2000);
        assert_eq!(backoff_delay_ms(3), 4000);
        assert_eq!(backoff_delay_ms(6), 30000);
        assert_eq!(backoff_delay_ms(40), 30000);
    }

    #[test]
    fn test_heartbeat_payload() {
        let json = serde_json::to_string(&heartbeat_payload(None)).unwrap();
        assert_eq!(json, r#"{"op":1,"d":null}"#);
        let json = serde_json::to_string(&heartbeat_payload(Some(7))).unwrap();
        assert_eq!(json, r#"{"op":1,"d":7}"#);
    }

    #[test]
    fn test_dispatch_ready() {
        let payload = parse_payload(
            r#"{"op":0,"s":1,"t":"READY","d":{"v":10,"user":{"id":"99","username":"solscope","bot":true},"session_id":"abc","guilds":[]}}"#,
        )
        .unwrap();
        match dispatch_event(&payload) {
            Some(GatewayEvent::Ready { user_id, username }) => {
                assert_eq!(user_id, "99");
                assert_eq!(username, "solscope");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_ignores_other_events() {
        let payload =
            parse_payload(r#"{"op":0,"s":2,"t":"TYPING_START","d":{"channel_id":"1"}}"#).unwrap();
        assert!(dispatch_event(&payload).is_none());
    }

    #[test]
    fn test_dispatch_message_create() {
        let payload = parse_payload(
            r#"{"op":0,"s":3,"t":"MESSAGE_CREATE","d":{"id":"1","channel_id":"2","author":{"id":"3"},"content":"hi"}}"#,
        )
        .unwrap();
        match dispatch_event(&payload) {
            Some(GatewayEvent::Message(msg)) => assert_eq!(msg.content, "hi"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
