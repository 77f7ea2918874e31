use pocketverse_common::{AppState, Character, Message, SocialPost, UserProfile, WorldState};

use super::{format_history, or_placeholder, Prompt};
use crate::responses::ChatReply;

/// Turns of history included in chat and storyline prompts.
pub const HISTORY_WINDOW: usize = 20;

const NEWS_HEADLINES: usize = 3;
const VISIBLE_POSTS: usize = 5;
const OFFERED_TICKETS: usize = 3;
const POST_PREVIEW_BYTES: usize = 120;

/// Everything a character can know when replying.
#[derive(Debug, Clone, Copy)]
pub struct ChatContext<'a> {
    pub character: &'a Character,
    /// Prior messages, oldest first, not including the new user text.
    pub history: &'a [Message],
    pub world: &'a WorldState,
    pub user: &'a UserProfile,
    /// Recent feed, newest first. Only read when the character perceives social media.
    pub recent_posts: &'a [SocialPost],
    /// Used to resolve post author names.
    pub roster: &'a [Character],
}

impl<'a> ChatContext<'a> {
    pub fn from_state(state: &'a AppState, character_id: &str) -> Option<Self> {
        let character = state.character(character_id)?;
        Some(Self {
            character,
            history: state.history(character_id),
            world: &state.world,
            user: &state.user,
            recent_posts: &state.moments,
            roster: &state.characters,
        })
    }
}

/// Build the chat reply prompt.
///
/// World and user-persona context are gated by the character's perception
/// flags: without `perceive_world_news` neither the world description nor
/// the headlines appear, and without `perceive_user_persona` only the
/// user's name does.
pub fn chat_reply_prompt(ctx: &ChatContext<'_>, user_text: &str) -> Prompt {
    let c = ctx.character;
    let mut system = format!(
        "你现在要扮演一个真实的人，正在用手机聊天软件和对方聊天。\n\n\
【你的身份】\n姓名: {name}\n背景: {background}\n偏好: {preferences}\n当前剧情: {storyline}",
        name = c.name,
        background = or_placeholder(&c.background),
        preferences = or_placeholder(&c.preferences),
        storyline = or_placeholder(&c.storyline),
    );

    system.push_str(&format!("\n\n【今天】{}", ctx.world.current_date));

    if c.perceive_world_news {
        system.push_str(&format!(
            "\n\n【世界观】\n{}",
            or_placeholder(&ctx.world.world_description)
        ));
        let headlines: Vec<&str> = ctx
            .world
            .news
            .iter()
            .take(NEWS_HEADLINES)
            .map(|n| n.title.as_str())
            .collect();
        if !headlines.is_empty() {
            system.push_str("\n最近的新闻:");
            for title in headlines {
                system.push_str(&format!("\n- {title}"));
            }
        }
    }

    system.push_str(&format!("\n\n【聊天对象】\n名字: {}", ctx.user.name));
    if c.perceive_user_persona && !ctx.user.persona.trim().is_empty() {
        system.push_str(&format!("\n人设: {}", ctx.user.persona));
    }

    if c.perceive_social_media && !ctx.recent_posts.is_empty() {
        system.push_str("\n\n【你最近刷到的动态】");
        for post in ctx.recent_posts.iter().take(VISIBLE_POSTS) {
            let author = post.author_display_name(ctx.roster, ctx.user);
            let preview = ai_client::truncate_to_char_boundary(&post.content, POST_PREVIEW_BYTES);
            system.push_str(&format!("\n- {author}: {preview}"));
        }
    }

    system.push_str(&format!(
        "\n\n【行为倾向】\n主动找对方聊天: {}\n主动邀约见面: {}",
        c.proactive_message_frequency.describe(),
        c.proactive_date_frequency.describe(),
    ));
    if c.allow_virtual_transfer {
        system.push_str("\n你可以在合适的时候用动作描述给对方转账或发红包。");
    }
    if c.proactive_ticketing {
        let offers: Vec<String> = ctx
            .world
            .tickets
            .iter()
            .filter(|t| !t.is_purchased)
            .take(OFFERED_TICKETS)
            .map(|t| format!("- {} ({}, ¥{})", t.title, t.date, t.price))
            .collect();
        if !offers.is_empty() {
            system.push_str("\n如果气氛合适，你可以主动邀请对方一起去看:");
            for offer in offers {
                system.push_str(&format!("\n{offer}"));
            }
        }
    }

    system.push_str(
        "\n\n【输出要求】\n\
把回复拆成若干段 segments，按发送顺序排列。\n\
每段的 type 为 \"speech\"（说出口的话）或 \"action\"（神态、动作描写，不要带括号）。\n\
像真人发消息一样简短自然，通常 1 到 4 段。\n\
始终保持人设，不要提及自己是 AI 或语言模型。",
    );

    let mut user = String::new();
    let history = format_history(ctx.history, &c.name, HISTORY_WINDOW);
    if !history.is_empty() {
        user.push_str(&format!("【聊天记录】\n{history}\n\n"));
    }
    user.push_str(&format!("用户: {user_text}\n\n请以{}的身份回复。", c.name));

    Prompt::structured::<ChatReply>(system, user)
}
