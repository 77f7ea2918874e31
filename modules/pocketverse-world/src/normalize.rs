//! Turns raw provider text into typed results.
//!
//! Nothing here fails. Unparseable output becomes the call site's fallback
//! (an empty list, or one placeholder segment for chat), invalid list items
//! are dropped one by one, and roster-constrained names are checked before
//! anything leaves this module.

use pocketverse_common::{Character, UNKNOWN_AUTHOR_ID};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::responses::{
    GeneratedHotSearch, GeneratedInteraction, GeneratedNews, GeneratedPost, GeneratedTicket,
    GeneratedVirtualPost, ReplySegment,
};

/// Shown when a chat reply could not be produced.
pub const SILENCE_PLACEHOLDER: &str = "…… (由于信号不好，他似乎沉默了)";

const MAX_STORYLINE_BYTES: usize = 600;

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// The set of names generated content may be attributed to.
#[derive(Debug, Clone)]
pub struct Roster<'a> {
    members: Vec<&'a Character>,
}

impl<'a> Roster<'a> {
    pub fn new(members: impl IntoIterator<Item = &'a Character>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }

    /// Exact, case-sensitive match.
    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|c| c.name == name)
    }

    /// Id of the member called `name`, or [`UNKNOWN_AUTHOR_ID`].
    pub fn id_for(&self, name: &str) -> &'a str {
        self.members
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.id.as_str())
            .unwrap_or(UNKNOWN_AUTHOR_ID)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Lenient list extraction
// ---------------------------------------------------------------------------

/// Pull the list stored under `key` out of a provider response.
///
/// Accepts the wrapped object the schema asks for, a bare array, or a
/// wrapper whose list was stringified. Items that fail to deserialize are
/// skipped.
fn parse_list<T: DeserializeOwned>(raw: &str, key: &str) -> Vec<T> {
    let json = ai_client::extract_json(raw);
    let value: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "Response is not valid JSON");
            return Vec::new();
        }
    };

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => items,
            Some(Value::String(s)) => match serde_json::from_str::<Vec<Value>>(&s) {
                Ok(items) => items,
                Err(e) => {
                    warn!(key, error = %e, "Stringified list is not a JSON array");
                    return Vec::new();
                }
            },
            Some(Value::Null) => Vec::new(),
            Some(_) => {
                warn!(key, "Expected a list");
                return Vec::new();
            }
            None => {
                warn!(key, "Response is missing its list");
                return Vec::new();
            }
        },
        _ => {
            warn!(key, "Response is neither an object nor an array");
            return Vec::new();
        }
    };

    let total = items.len();
    let parsed: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!(key, error = %e, "Dropping malformed item");
                None
            }
        })
        .collect();
    if parsed.len() < total {
        warn!(key, total, kept = parsed.len(), "Dropped malformed items");
    }
    parsed
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

// ---------------------------------------------------------------------------
// Per call site
// ---------------------------------------------------------------------------

/// Chat segments. Never empty: falls back to one placeholder speech segment.
pub fn chat_segments(raw: &str) -> Vec<ReplySegment> {
    let segments: Vec<ReplySegment> = parse_list::<ReplySegment>(raw, "segments")
        .into_iter()
        .filter(|s| !is_blank(&s.text))
        .collect();
    if segments.is_empty() {
        return silence();
    }
    segments
}

/// The chat fallback value.
pub fn silence() -> Vec<ReplySegment> {
    vec![ReplySegment::speech(SILENCE_PLACEHOLDER)]
}

pub fn news(raw: &str) -> Vec<GeneratedNews> {
    parse_list::<GeneratedNews>(raw, "news")
        .into_iter()
        .filter(|n| !is_blank(&n.title))
        .collect()
}

pub fn hot_searches(raw: &str) -> Vec<GeneratedHotSearch> {
    parse_list::<GeneratedHotSearch>(raw, "hotSearches")
        .into_iter()
        .filter(|h| !is_blank(&h.title))
        .collect()
}

/// Tickets with a valid category enum. Whether the category matches the
/// requested hint is not checked.
pub fn tickets(raw: &str) -> Vec<GeneratedTicket> {
    parse_list::<GeneratedTicket>(raw, "tickets")
        .into_iter()
        .filter(|t| !is_blank(&t.title) && t.price.is_finite() && t.price >= 0.0)
        .collect()
}

/// Roster-authored posts. Entries whose author is not in `roster` are dropped.
pub fn roster_posts(raw: &str, roster: &Roster<'_>) -> Vec<GeneratedPost> {
    parse_list::<GeneratedPost>(raw, "posts")
        .into_iter()
        .filter(|p| {
            if !roster.contains(&p.author_name) {
                warn!(author = %p.author_name, "Dropping post by unknown author");
                return false;
            }
            !is_blank(&p.content)
        })
        .collect()
}

/// Posts by invented authors. Names are kept as generated.
pub fn virtual_posts(raw: &str) -> Vec<GeneratedVirtualPost> {
    parse_list::<GeneratedVirtualPost>(raw, "posts")
        .into_iter()
        .filter(|p| !is_blank(&p.author_name) && !is_blank(&p.content))
        .collect()
}

/// Roster comments, at most `max_replies`. Both the author and any reply
/// target must be roster names; otherwise the whole entry is dropped.
pub fn interactions(
    raw: &str,
    roster: &Roster<'_>,
    max_replies: usize,
) -> Vec<GeneratedInteraction> {
    parse_list::<GeneratedInteraction>(raw, "interactions")
        .into_iter()
        .map(|mut i| {
            if i.reply_to_name.as_deref().is_some_and(is_blank) {
                i.reply_to_name = None;
            }
            i
        })
        .filter(|i| {
            if !roster.contains(&i.author_name) {
                warn!(author = %i.author_name, "Dropping comment by unknown author");
                return false;
            }
            if let Some(target) = &i.reply_to_name {
                if !roster.contains(target) {
                    warn!(reply_to = %target, "Dropping comment replying to unknown name");
                    return false;
                }
            }
            !is_blank(&i.content)
        })
        .take(max_replies)
        .collect()
}

/// A storyline paragraph, or `None` when the model said nothing usable.
pub fn storyline(raw: &str) -> Option<String> {
    let text = ai_client::strip_code_blocks(raw)
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '"' | '“' | '”' | '「' | '」'));
    if text.is_empty() {
        return None;
    }
    Some(ai_client::truncate_to_char_boundary(text, MAX_STORYLINE_BYTES).to_string())
}
