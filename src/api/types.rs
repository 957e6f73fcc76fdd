//! Wire types for the chat and character endpoints

use crate::session::Message;
use serde::{Deserialize, Serialize};

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_message: String,
    pub conversation_history: Vec<Message>,
}

/// Successful `POST /chat` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub assistant_message: String,
    /// Replaces the client transcript wholesale when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_history: Option<Vec<Message>>,
    /// Appended to the transcript, never displayed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<Message>,
}

impl ChatReply {
    #[allow(dead_code)] // Constructor for tests and mock backends
    pub fn text(assistant_message: impl Into<String>) -> Self {
        Self {
            assistant_message: assistant_message.into(),
            conversation_history: None,
            metadata: vec![],
        }
    }
}

/// `GET /character` response. The field set varies between backend
/// revisions, so everything is optional. Numbers may arrive as floats
/// (`"gold": 10.0`), so numeric slots take any JSON number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterRecord {
    pub name: Option<String>,
    pub race: Option<String>,
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    pub background: Option<String>,

    pub current_hit_points: Option<f64>,
    pub armor_class: Option<f64>,
    pub gold: Option<f64>,

    pub strength: Option<f64>,
    pub dexterity: Option<f64>,
    pub constitution: Option<f64>,
    pub intelligence: Option<f64>,
    pub wisdom: Option<f64>,
    pub charisma: Option<f64>,

    pub traits: Option<Vec<String>>,
    pub saving_throws: Option<Vec<String>>,
    pub proficiencies: Option<Vec<String>>,
    pub inventory: Option<Vec<String>>,
}
