use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JoinMessage {
    #[serde(default)]
    pub room: Value,
}

/// Proposed new content for a pad. `text` is kept untyped so that a
/// non-string payload can be dropped instead of failing the whole frame.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UpdateMessage {
    #[serde(default)]
    pub room: Value,
    #[serde(default)]
    pub text: Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PingMessage {}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InitMessage {
    pub room: String,
    pub text: String,
    pub version: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PresenceMessage {
    pub count: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ApplyMessage {
    pub room: String,
    pub text: String,
    pub version: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AckMessage {
    pub version: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PongMessage {
    pub date: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ReceivedMessage {
    #[serde(rename = "join")]
    Join(JoinMessage),
    #[serde(rename = "update")]
    Update(UpdateMessage),
    #[serde(rename = "ping")]
    Ping(PingMessage),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SendMessage {
    #[serde(rename = "init")]
    Init(InitMessage),
    #[serde(rename = "presence")]
    Presence(PresenceMessage),
    #[serde(rename = "apply")]
    Apply(ApplyMessage),
    #[serde(rename = "ack")]
    Ack(AckMessage),
    #[serde(rename = "pong")]
    Pong(PongMessage),
}
