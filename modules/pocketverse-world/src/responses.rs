//! What the model is asked to return, one type per call site.
//!
//! These are wire types: the JSON schemas sent to providers are derived from
//! them and provider output is decoded into them. Turning them into
//! persisted entities (ids, timestamps, author ids) happens in the engine.

use pocketverse_common::TicketCategory;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

// --- Chat ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Spoken dialogue.
    Speech,
    /// Narrated action or stage direction.
    Action,
}

/// One unit of a chat reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReplySegment {
    /// "speech" for dialogue, "action" for narrated action
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub text: String,
}

impl ReplySegment {
    pub fn speech(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Speech,
            text: text.into(),
        }
    }

    pub fn action(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Action,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChatReply {
    pub segments: Vec<ReplySegment>,
}

// --- News ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedNews {
    pub title: String,
    pub content: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewsResponse {
    pub news: Vec<GeneratedNews>,
}

// --- Hot searches ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedHotSearch {
    pub title: String,
    /// Human-readable popularity, e.g. "120w"
    pub hotness: String,
    /// One of "热", "新", "爆", "荐"
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotSearchResponse {
    pub hot_searches: Vec<GeneratedHotSearch>,
}

// --- Tickets ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedTicket {
    pub title: String,
    /// Event date, YYYY-MM-DD
    pub date: String,
    /// Price in yuan
    #[serde(deserialize_with = "number_or_string")]
    pub price: f64,
    pub category: TicketCategory,
    /// Poster image URL
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TicketResponse {
    pub tickets: Vec<GeneratedTicket>,
}

/// Accept `1280`, `1280.0` or `"1280"`.
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de;
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| de::Error::custom("price out of range")),
        serde_json::Value::String(s) => s
            .trim()
            .trim_start_matches(['¥', '￥'])
            .parse()
            .map_err(de::Error::custom),
        _ => Err(de::Error::custom("price must be a number")),
    }
}

// --- Social posts ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPost {
    /// Must be exactly one of the listed character names
    pub author_name: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RosterPostsResponse {
    pub posts: Vec<GeneratedPost>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedVirtualPost {
    pub author_name: String,
    /// Avatar image URL
    pub author_avatar: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VirtualPostsResponse {
    pub posts: Vec<GeneratedVirtualPost>,
}

// --- Interactions ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedInteraction {
    /// Must be exactly one of the listed character names
    pub author_name: String,
    pub content: String,
    /// Name of the earlier commenter this comment replies to, if any
    #[serde(default)]
    pub reply_to_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InteractionsResponse {
    pub interactions: Vec<GeneratedInteraction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_client::StructuredOutput;

    #[test]
    fn segment_schema_declares_both_kinds() {
        let schema = ChatReply::output_schema();
        let kind = &schema["properties"]["segments"]["items"]["properties"]["type"];
        assert_eq!(kind["enum"], serde_json::json!(["speech", "action"]));
    }

    #[test]
    fn gemini_segment_schema_is_a_string_enum() {
        let schema = ai_client::schema::to_gemini_schema(&ChatReply::output_schema());
        let kind = &schema["properties"]["segments"]["items"]["properties"]["type"];
        assert_eq!(kind["type"], "STRING");
        assert_eq!(kind["enum"], serde_json::json!(["speech", "action"]));
    }

    #[test]
    fn ticket_schema_restricts_category() {
        let schema = TicketResponse::output_schema();
        let category = &schema["properties"]["tickets"]["items"]["properties"]["category"];
        assert_eq!(
            category["enum"],
            serde_json::json!(["concert", "movie", "theater", "sports", "exhibition"])
        );
    }

    #[test]
    fn ticket_price_accepts_strings() {
        let ticket: GeneratedTicket = serde_json::from_value(serde_json::json!({
            "title": "话剧《雷雨》",
            "date": "2025-06-10",
            "price": "¥380",
            "category": "theater",
            "image": "https://picsum.photos/seed/drama/300/400"
        }))
        .unwrap();
        assert!((ticket.price - 380.0).abs() < f64::EPSILON);
    }

    #[test]
    fn interaction_uses_camel_case_keys() {
        let interaction: GeneratedInteraction = serde_json::from_value(serde_json::json!({
            "authorName": "A",
            "content": "好看",
            "replyToName": "B"
        }))
        .unwrap();
        assert_eq!(interaction.reply_to_name.as_deref(), Some("B"));
    }
}
