//! Normalized wire items → persisted entities (ids, timestamps, author ids).

use pocketverse_common::{
    Comment, HotSearchItem, HotTag, Message, MessageKind, Millis, NewsItem, Platform, SocialPost,
    Ticket, VIRTUAL_AUTHOR_ID,
};
use rand::Rng;
use uuid::Uuid;

use crate::normalize::Roster;
use crate::responses::{
    GeneratedHotSearch, GeneratedInteraction, GeneratedNews, GeneratedPost, GeneratedTicket,
    GeneratedVirtualPost, ReplySegment, SegmentKind,
};

/// Gap between consecutive posts of one batch, so feed order is stable.
const POST_SPACING_MS: Millis = 60_000;

fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

/// Chat messages from reply segments, one millisecond apart starting at `start`.
pub fn reply_messages(character_id: &str, segments: Vec<ReplySegment>, start: Millis) -> Vec<Message> {
    segments
        .into_iter()
        .enumerate()
        .map(|(i, segment)| {
            let kind = match segment.kind {
                SegmentKind::Speech => MessageKind::Text,
                SegmentKind::Action => MessageKind::Action,
            };
            Message::new(character_id, segment.text, kind, start + i as Millis)
        })
        .collect()
}

pub fn news_items(items: Vec<GeneratedNews>, now: Millis) -> Vec<NewsItem> {
    items
        .into_iter()
        .map(|n| NewsItem {
            id: new_id("news"),
            title: n.title,
            content: n.content,
            category: n.category,
            timestamp: now,
        })
        .collect()
}

/// Unknown badge text is dropped rather than failing the item.
pub fn hot_search_items(items: Vec<GeneratedHotSearch>) -> Vec<HotSearchItem> {
    items
        .into_iter()
        .map(|h| HotSearchItem {
            id: new_id("hot"),
            title: h.title,
            hotness: h.hotness,
            tag: h.tag.as_deref().and_then(HotTag::parse),
        })
        .collect()
}

pub fn ticket_items(items: Vec<GeneratedTicket>) -> Vec<Ticket> {
    items
        .into_iter()
        .map(|t| Ticket {
            id: new_id("ticket"),
            title: t.title,
            date: t.date,
            price: t.price,
            category: t.category,
            image: t.image,
            is_purchased: false,
        })
        .collect()
}

/// Roster posts, newest first.
pub fn roster_post_items(
    items: Vec<GeneratedPost>,
    roster: &Roster<'_>,
    platform: Platform,
    now: Millis,
) -> Vec<SocialPost> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let mut post = SocialPost::new(
                roster.id_for(&p.author_name),
                p.content,
                platform,
                now - i as Millis * POST_SPACING_MS,
            );
            post.author_name = Some(p.author_name);
            post
        })
        .collect()
}

/// Recommended weibo posts with inline synthetic authors.
pub fn virtual_post_items(items: Vec<GeneratedVirtualPost>, now: Millis) -> Vec<SocialPost> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let mut post = SocialPost::new(
                VIRTUAL_AUTHOR_ID,
                p.content,
                Platform::Weibo,
                now - i as Millis * POST_SPACING_MS,
            );
            post.author_name = Some(p.author_name);
            post.author_avatar = Some(p.author_avatar);
            post.is_virtual = true;
            post.likes = popularity();
            post
        })
        .collect()
}

/// Comments in generation order, one millisecond apart after `now`.
pub fn comment_items(
    items: Vec<GeneratedInteraction>,
    roster: &Roster<'_>,
    now: Millis,
) -> Vec<Comment> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, c)| Comment {
            id: new_id("comment"),
            author_id: roster.id_for(&c.author_name).to_string(),
            author_name: c.author_name,
            content: c.content,
            timestamp: now + i as Millis,
            reply_to_name: c.reply_to_name,
        })
        .collect()
}

// Recommended posts arrive with some likes already.
fn popularity() -> u32 {
    rand::rng().random_range(100..10_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocketverse_common::{Character, UNKNOWN_AUTHOR_ID};

    #[test]
    fn segments_become_text_and_action_messages() {
        let messages = reply_messages(
            "c1",
            vec![ReplySegment::action("笑"), ReplySegment::speech("嗨")],
            100,
        );
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].kind, MessageKind::Action);
        assert_eq!(messages[1].kind, MessageKind::Text);
        assert_eq!(messages[1].sender_id, "c1");
        assert!(messages[0].timestamp < messages[1].timestamp);
        assert_ne!(messages[0].id, messages[1].id);
    }

    #[test]
    fn hot_search_badges_parse_or_drop() {
        let items = hot_search_items(vec![
            GeneratedHotSearch {
                title: "a".into(),
                hotness: "1w".into(),
                tag: Some("爆".into()),
            },
            GeneratedHotSearch {
                title: "b".into(),
                hotness: "2w".into(),
                tag: Some("火".into()),
            },
        ]);
        assert_eq!(items[0].tag, Some(HotTag::Boom));
        assert_eq!(items[1].tag, None);
    }

    #[test]
    fn roster_posts_carry_author_ids_and_descending_times() {
        let people = vec![Character::new("id-a", "A")];
        let roster = Roster::new(&people);
        let posts = roster_post_items(
            vec![
                GeneratedPost {
                    author_name: "A".into(),
                    content: "1".into(),
                },
                GeneratedPost {
                    author_name: "Z".into(),
                    content: "2".into(),
                },
            ],
            &roster,
            Platform::Moments,
            1_000_000,
        );
        assert_eq!(posts[0].author_id, "id-a");
        assert_eq!(posts[1].author_id, UNKNOWN_AUTHOR_ID);
        assert!(posts[0].timestamp > posts[1].timestamp);
        assert!(posts.iter().all(|p| !p.is_virtual && p.platform == Platform::Moments));
    }

    #[test]
    fn virtual_posts_are_marked_and_popular() {
        let posts = virtual_post_items(
            vec![GeneratedVirtualPost {
                author_name: "科技小喵".into(),
                author_avatar: "https://picsum.photos/seed/cat/100/100".into(),
                content: "c".into(),
            }],
            5,
        );
        assert!(posts[0].is_virtual);
        assert_eq!(posts[0].author_id, VIRTUAL_AUTHOR_ID);
        assert_eq!(posts[0].platform, Platform::Weibo);
        assert!((100..10_000).contains(&posts[0].likes));
    }

    #[test]
    fn tickets_start_unpurchased() {
        let tickets = ticket_items(vec![GeneratedTicket {
            title: "t".into(),
            date: "2025-06-01".into(),
            price: 80.0,
            category: pocketverse_common::TicketCategory::Exhibition,
            image: String::new(),
        }]);
        assert!(!tickets[0].is_purchased);
        assert!(tickets[0].id.starts_with("ticket-"));
    }
}
