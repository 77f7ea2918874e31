//! Prompt builders. Every builder is a pure function of its inputs.

mod chat;
mod social;
mod storyline;
mod world;

pub use chat::{chat_reply_prompt, ChatContext, HISTORY_WINDOW};
pub use social::{
    eligible_authors, interactions_prompt, roster_posts_prompt, virtual_posts_prompt,
};
pub use storyline::storyline_prompt;
pub use world::{hot_searches_prompt, news_prompt, tickets_prompt};

use ai_client::{CompletionRequest, StructuredOutput};
use pocketverse_common::{Character, Message, MessageKind};
use serde_json::Value;

/// A system instruction, a user turn and the output contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    /// `None` asks for free text.
    pub schema: Option<Value>,
}

impl Prompt {
    pub fn text(system: String, user: String) -> Self {
        Self {
            system,
            user,
            schema: None,
        }
    }

    pub fn structured<T: StructuredOutput>(system: String, user: String) -> Self {
        Self {
            system,
            user,
            schema: Some(T::output_schema()),
        }
    }

    pub fn request(&self, model: &str) -> CompletionRequest {
        let request = CompletionRequest::new(model, self.system.clone(), self.user.clone());
        match &self.schema {
            Some(schema) => request.schema(schema.clone()),
            None => request,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared fragments
// ---------------------------------------------------------------------------

/// One line per history message, oldest first, limited to the last `window`.
pub(crate) fn format_history(
    history: &[Message],
    character_name: &str,
    window: usize,
) -> String {
    let start = history.len().saturating_sub(window);
    history[start..]
        .iter()
        .map(|m| {
            let speaker = if m.is_from_user() {
                "用户"
            } else {
                character_name
            };
            format!("{speaker}: {}", describe_message(m))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_message(message: &Message) -> String {
    match message.kind {
        MessageKind::Text => message.text.clone(),
        MessageKind::Action => format!("（{}）", message.text),
        MessageKind::Transfer => match message.amount {
            Some(amount) => format!("[转账 ¥{amount:.2}]"),
            None => "[转账]".to_string(),
        },
        MessageKind::Image => "[图片]".to_string(),
        MessageKind::Sticker => "[表情]".to_string(),
        MessageKind::Location => match &message.location_name {
            Some(place) => format!("[位置: {place}]"),
            None => "[位置]".to_string(),
        },
    }
}

/// The exclusive author list for roster-constrained prompts.
pub(crate) fn roster_block(authors: &[&Character], with_background: bool) -> String {
    authors
        .iter()
        .map(|c| {
            if with_background && !c.background.trim().is_empty() {
                format!("- {}: {}", c.name, c.background)
            } else {
                format!("- {}", c.name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn or_placeholder(text: &str) -> &str {
    if text.trim().is_empty() {
        "（未设定）"
    } else {
        text
    }
}
