use std::collections::BTreeMap;

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Sender id used for the player in chats and as a post author.
pub const USER_ID: &str = "user";
/// Author id for generated entries whose name matched no roster character.
pub const UNKNOWN_AUTHOR_ID: &str = "unknown";
/// Author id shared by all synthetic (non-roster) post authors.
pub const VIRTUAL_AUTHOR_ID: &str = "virtual";

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

pub fn now_millis() -> Millis {
    Utc::now().timestamp_millis()
}

fn default_true() -> bool {
    true
}

// --- Characters ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    None,
    Low,
    #[default]
    Medium,
    High,
}

impl Frequency {
    /// Prompt wording for this frequency.
    pub fn describe(&self) -> &'static str {
        match self {
            Frequency::None => "从不",
            Frequency::Low => "偶尔",
            Frequency::Medium => "适度",
            Frequency::High => "频繁",
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Frequency::None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub preferences: String,
    #[serde(default)]
    pub storyline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_message: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,

    // Perception
    #[serde(default = "default_true")]
    pub perceive_world_news: bool,
    #[serde(default = "default_true")]
    pub perceive_social_media: bool,
    #[serde(default = "default_true")]
    pub perceive_user_persona: bool,

    // Behaviour
    #[serde(default)]
    pub moments_frequency: Frequency,
    #[serde(default)]
    pub weibo_frequency: Frequency,
    #[serde(default)]
    pub proactive_message_frequency: Frequency,
    #[serde(default)]
    pub proactive_date_frequency: Frequency,
    #[serde(default)]
    pub allow_virtual_transfer: bool,
    #[serde(default)]
    pub proactive_ticketing: bool,
}

impl Character {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: String::new(),
            background: String::new(),
            preferences: String::new(),
            storyline: String::new(),
            first_message: None,
            is_favorite: false,
            perceive_world_news: true,
            perceive_social_media: true,
            perceive_user_persona: true,
            moments_frequency: Frequency::default(),
            weibo_frequency: Frequency::default(),
            proactive_message_frequency: Frequency::default(),
            proactive_date_frequency: Frequency::default(),
            allow_virtual_transfer: false,
            proactive_ticketing: false,
        }
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    pub fn frequency_on(&self, platform: Platform) -> Frequency {
        match platform {
            Platform::Moments => self.moments_frequency,
            Platform::Weibo => self.weibo_frequency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    #[serde(default)]
    pub wechat_id: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub persona: String,
}

// --- Chat ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Action,
    Image,
    Transfer,
    Sticker,
    Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Received,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub timestamp: Millis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransferStatus>,
}

impl Message {
    pub fn new(
        sender_id: impl Into<String>,
        text: impl Into<String>,
        kind: MessageKind,
        timestamp: Millis,
    ) -> Self {
        Self {
            id: format!("msg-{}", uuid::Uuid::new_v4()),
            sender_id: sender_id.into(),
            text: text.into(),
            kind,
            timestamp,
            amount: None,
            location_name: None,
            status: None,
        }
    }

    pub fn from_user(text: impl Into<String>, timestamp: Millis) -> Self {
        Self::new(USER_ID, text, MessageKind::Text, timestamp)
    }

    pub fn transfer(sender_id: impl Into<String>, amount: f64, timestamp: Millis) -> Self {
        let mut message = Self::new(sender_id, format!("转账 ¥{amount:.2}"), MessageKind::Transfer, timestamp);
        message.amount = Some(amount);
        message.status = Some(TransferStatus::Pending);
        message
    }

    pub fn is_from_user(&self) -> bool {
        self.sender_id == USER_ID
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub character_id: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub last_message_at: Millis,
    #[serde(default)]
    pub unread_count: u32,
    /// Set while a reply is being generated. Never persisted.
    #[serde(skip)]
    pub is_typing: bool,
    #[serde(default)]
    pub revision: u64,
}

impl ChatSession {
    pub fn new(character_id: impl Into<String>) -> Self {
        Self {
            character_id: character_id.into(),
            messages: Vec::new(),
            last_message_at: 0,
            unread_count: 0,
            is_typing: false,
            revision: 0,
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

// --- Social ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Moments,
    Weibo,
}

impl Platform {
    /// Name used in prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Moments => "朋友圈",
            Platform::Weibo => "微博",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    pub timestamp: Millis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_name: Option<String>,
}

impl Comment {
    pub fn new(
        author_id: impl Into<String>,
        author_name: impl Into<String>,
        content: impl Into<String>,
        timestamp: Millis,
    ) -> Self {
        Self {
            id: format!("comment-{}", uuid::Uuid::new_v4()),
            author_id: author_id.into(),
            author_name: author_name.into(),
            content: content.into(),
            timestamp,
            reply_to_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialPost {
    pub id: String,
    pub author_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub timestamp: Millis,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub liked_by_me: bool,
    #[serde(default, rename = "commentsList")]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub revision: u64,
}

/// Who wrote a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAuthor<'a> {
    User,
    Character(&'a str),
    Virtual { name: &'a str, avatar: &'a str },
}

impl SocialPost {
    pub fn new(
        author_id: impl Into<String>,
        content: impl Into<String>,
        platform: Platform,
        timestamp: Millis,
    ) -> Self {
        Self {
            id: format!("post-{}", uuid::Uuid::new_v4()),
            author_id: author_id.into(),
            author_name: None,
            author_avatar: None,
            content: content.into(),
            images: Vec::new(),
            timestamp,
            likes: 0,
            liked_by_me: false,
            comments: Vec::new(),
            platform,
            is_virtual: false,
            revision: 0,
        }
    }

    pub fn author(&self) -> PostAuthor<'_> {
        if self.is_virtual {
            PostAuthor::Virtual {
                name: self.author_name.as_deref().unwrap_or_default(),
                avatar: self.author_avatar.as_deref().unwrap_or_default(),
            }
        } else if self.author_id == USER_ID {
            PostAuthor::User
        } else {
            PostAuthor::Character(&self.author_id)
        }
    }

    /// Display name of the author, resolved against the roster and user.
    pub fn author_display_name(&self, roster: &[Character], user: &UserProfile) -> String {
        match self.author() {
            PostAuthor::User => user.name.clone(),
            PostAuthor::Virtual { name, .. } => name.to_string(),
            PostAuthor::Character(id) => roster
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.clone())
                .or_else(|| self.author_name.clone())
                .unwrap_or_else(|| "未知用户".to_string()),
        }
    }
}

// --- World ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub timestamp: Millis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HotTag {
    #[serde(rename = "热")]
    Hot,
    #[serde(rename = "新")]
    New,
    #[serde(rename = "爆")]
    Boom,
    #[serde(rename = "荐")]
    Recommended,
}

impl HotTag {
    pub const ALL: [&'static str; 4] = ["热", "新", "爆", "荐"];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "热" => Some(HotTag::Hot),
            "新" => Some(HotTag::New),
            "爆" => Some(HotTag::Boom),
            "荐" => Some(HotTag::Recommended),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotSearchItem {
    pub id: String,
    pub title: String,
    pub hotness: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<HotTag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TicketCategory {
    Concert,
    Movie,
    Theater,
    Sports,
    Exhibition,
}

impl TicketCategory {
    pub const ALL: [TicketCategory; 5] = [
        TicketCategory::Concert,
        TicketCategory::Movie,
        TicketCategory::Theater,
        TicketCategory::Sports,
        TicketCategory::Exhibition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketCategory::Concert => "concert",
            TicketCategory::Movie => "movie",
            TicketCategory::Theater => "theater",
            TicketCategory::Sports => "sports",
            TicketCategory::Exhibition => "exhibition",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub date: String,
    pub price: f64,
    pub category: TicketCategory,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub is_purchased: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    pub world_description: String,
    pub current_date: String,
    #[serde(default)]
    pub news: Vec<NewsItem>,
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub hot_searches: Vec<HotSearchItem>,
    #[serde(default = "default_true")]
    pub enable_moments_interaction: bool,
    #[serde(default = "default_max_replies")]
    pub max_moment_replies: u32,
}

fn default_max_replies() -> u32 {
    4
}

// --- API configuration ---

/// Which configured model serves a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Chat,
    World,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSettings {
    pub model: String,
    #[serde(default)]
    pub api_key: String,
}

impl ApiSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: String::new(),
        }
    }

    /// The inline key, if one is set.
    pub fn explicit_key(&self) -> Option<&str> {
        Some(self.api_key.as_str()).filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    pub chat: ApiSettings,
    pub world: ApiSettings,
    /// Credential vault keyed by provider slot (`gemini`, `zhipu`, `deepseek`, ...).
    #[serde(default)]
    pub provider_keys: BTreeMap<String, String>,
}

impl ApiConfig {
    pub fn settings(&self, purpose: Purpose) -> &ApiSettings {
        match purpose {
            Purpose::Chat => &self.chat,
            Purpose::World => &self.world,
        }
    }

    pub fn credentials(&self, purpose: Purpose) -> ai_client::Credentials<'_> {
        ai_client::Credentials::new(self.settings(purpose).explicit_key(), &self.provider_keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_defaults_when_flags_absent() {
        let character: Character = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "name": "沈逸",
            "background": "总裁"
        }))
        .unwrap();
        assert!(character.perceive_world_news);
        assert!(character.perceive_user_persona);
        assert_eq!(character.moments_frequency, Frequency::Medium);
        assert!(!character.proactive_ticketing);
    }

    #[test]
    fn test_message_type_field_name() {
        let msg = Message::new("c1", "(笑)", MessageKind::Action, 5);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "action");
        assert_eq!(value["senderId"], "c1");
        assert!(value.get("amount").is_none());
    }

    #[test]
    fn test_session_typing_flag_not_persisted() {
        let mut session = ChatSession::new("c1");
        session.is_typing = true;
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("isTyping"));
        let back: ChatSession = serde_json::from_str(&json).unwrap();
        assert!(!back.is_typing);
    }

    #[test]
    fn test_hot_tag_serializes_as_badge() {
        let item = HotSearchItem {
            id: "h1".into(),
            title: "极光能源".into(),
            hotness: "450w".into(),
            tag: Some(HotTag::Boom),
        };
        assert_eq!(serde_json::to_value(&item).unwrap()["tag"], "爆");
        assert_eq!(HotTag::parse(" 荐 "), Some(HotTag::Recommended));
        assert_eq!(HotTag::parse("火"), None);
    }

    #[test]
    fn test_ticket_category_parse() {
        assert_eq!(TicketCategory::parse("Concert"), Some(TicketCategory::Concert));
        assert_eq!(TicketCategory::parse("opera"), None);
    }

    #[test]
    fn test_post_author_variants() {
        let mut post = SocialPost::new("virtual", "转发抽奖", Platform::Weibo, 1);
        post.is_virtual = true;
        post.author_name = Some("科技小喵".into());
        assert!(matches!(post.author(), PostAuthor::Virtual { name: "科技小喵", .. }));

        let mine = SocialPost::new(USER_ID, "hi", Platform::Moments, 1);
        assert_eq!(mine.author(), PostAuthor::User);
    }

    #[test]
    fn test_api_credentials_ignore_blank_inline_key() {
        let mut config = ApiConfig {
            chat: ApiSettings::new("deepseek-chat"),
            world: ApiSettings::new("glm-4-flash"),
            provider_keys: BTreeMap::new(),
        };
        config.chat.api_key = "  ".into();
        assert!(config.credentials(Purpose::Chat).explicit.is_none());
        config.world.api_key = "k".into();
        assert_eq!(config.credentials(Purpose::World).explicit, Some("k"));
    }
}
