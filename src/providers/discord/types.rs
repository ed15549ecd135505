//! Discord wire types
//!
//! Only the slice of the gateway and REST schema the bot touches. Unknown
//! fields are ignored on the way in.

use serde::{Deserialize, Serialize};

use crate::models::{InboundMessage, Reply};

// ============================================
// GATEWAY OPCODES
// ============================================

pub const OP_DISPATCH: u8 = 0;
pub const OP_HEARTBEAT: u8 = 1;
pub const OP_IDENTIFY: u8 = 2;
pub const OP_RECONNECT: u8 = 7;
pub const OP_INVALID_SESSION: u8 = 9;
pub const OP_HELLO: u8 = 10;
pub const OP_HEARTBEAT_ACK: u8 = 11;

/// Activity type "Playing"
pub const ACTIVITY_GAME: u8 = 0;

// ============================================
// GATEWAY PAYLOADS
// ============================================

/// Envelope for every gateway frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayPayload {
    pub fn new(op: u8, d: serde_json::Value) -> Self {
        Self {
            op,
            d: Some(d),
            s: None,
            t: None,
        }
    }

    /// Decode `d` into a typed body
    pub fn data<T: for<'de> Deserialize<'de>>(&self) -> Option<T> {
        self.d
            .as_ref()
            .and_then(|d| serde_json::from_value(d.clone()).ok())
    }
}

/// op 10 body
#[derive(Debug, Clone, Deserialize)]
pub struct Hello {
    pub heartbeat_interval: u64,
}

/// op 2 body
#[derive(Debug, Clone, Serialize)]
pub struct Identify {
    pub token: String,
    pub intents: u64,
    pub properties: IdentifyProperties,
    pub presence: Presence,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdentifyProperties {
    pub os: String,
    pub browser: String,
    pub device: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Presence {
    pub since: Option<u64>,
    pub activities: Vec<Activity>,
    pub status: String,
    pub afk: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
}

impl Identify {
    pub fn new(token: &str, intents: u64, status_text: &str) -> Self {
        Self {
            token: token.to_string(),
            intents,
            properties: IdentifyProperties {
                os: std::env::consts::OS.to_string(),
                browser: "solscope".to_string(),
                device: "solscope".to_string(),
            },
            presence: Presence {
                since: None,
                activities: vec![Activity {
                    name: status_text.to_string(),
                    kind: ACTIVITY_GAME,
                }],
                status: "online".to_string(),
                afk: false,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

/// READY dispatch body
#[derive(Debug, Clone, Deserialize)]
pub struct Ready {
    pub user: User,
    pub session_id: String,
}

/// MESSAGE_CREATE dispatch body
#[derive(Debug, Clone, Deserialize)]
pub struct MessageCreate {
    pub id: String,
    pub channel_id: String,
    pub author: User,
    #[serde(default)]
    pub content: String,
}

impl From<MessageCreate> for InboundMessage {
    fn from(msg: MessageCreate) -> Self {
        Self {
            message_id: msg.id,
            channel_id: msg.channel_id,
            author_id: msg.author.id,
            content: msg.content,
        }
    }
}

/// Events forwarded from the gateway task to the bot
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    Ready { user_id: String, username: String },
    Message(InboundMessage),
    Disconnected,
    /// Gateway gave up; no further events follow
    Fatal(String),
}

// ============================================
// REST PAYLOADS
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl From<&Reply> for Embed {
    fn from(reply: &Reply) -> Self {
        Self {
            title: reply.title.clone(),
            description: reply.description.clone(),
            color: reply.color,
            fields: reply
                .fields
                .iter()
                .map(|f| EmbedField {
                    name: f.name.clone(),
                    value: f.value.clone(),
                    inline: false,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageReference {
    pub message_id: String,
    pub channel_id: String,
}

/// Body of `POST /channels/{id}/messages`
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessage {
    pub embeds: Vec<Embed>,
    pub message_reference: MessageReference,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReplyField;

    #[test]
    fn test_decode_message_create() {
        let raw = r#"{
            "op": 0, "s": 42, "t": "MESSAGE_CREATE",
            "d": {
                "id": "111", "channel_id": "222", "guild_id": "333",
                "author": { "id": "444", "username": "alice" },
                "content": "check So11111111111111111111111111111111111112"
            }
        }"#;
        let payload: GatewayPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.op, OP_DISPATCH);
        assert_eq!(payload.s, Some(42));
        assert_eq!(payload.t.as_deref(), Some("MESSAGE_CREATE"));

        let msg: InboundMessage = payload.data::<MessageCreate>().unwrap().into();
        assert_eq!(msg.message_id, "111");
        assert_eq!(msg.channel_id, "222");
        assert_eq!(msg.author_id, "444");
        assert!(msg.content.starts_with("check"));
    }

    #[test]
    fn test_decode_hello() {
        let raw = r#"{"op":10,"d":{"heartbeat_interval":41250},"s":null,"t":null}"#;
        let payload: GatewayPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.op, OP_HELLO);
        assert_eq!(payload.data::<Hello>().unwrap().heartbeat_interval, 41250);
    }

    #[test]
    fn test_identify_presence() {
        let identify = Identify::new("tok", 37377, "sol stuff");
        let json = serde_json::to_value(GatewayPayload::new(
            OP_IDENTIFY,
            serde_json::to_value(&identify).unwrap(),
        ))
        .unwrap();
        assert_eq!(json["op"], 2);
        assert_eq!(json["d"]["intents"], 37377);
        assert_eq!(json["d"]["presence"]["activities"][0]["name"], "sol stuff");
        assert_eq!(json["d"]["presence"]["activities"][0]["type"], 0);
        assert!(json.get("s").is_none());
    }

    #[test]
    fn test_embed_from_reply() {
        let reply = Reply {
            title: "Solana Wallet".to_string(),
            color: 0x00FF00,
            description: "Address: `x`".to_string(),
            fields: vec![ReplyField::new("Balance", "1.0000 SOL")],
        };
        let embed = Embed::from(&reply);
        assert_eq!(embed.title, "Solana Wallet");
        assert_eq!(embed.fields.len(), 1);
        assert!(!embed.fields[0].inline);
    }
}
