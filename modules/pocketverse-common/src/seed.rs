//! First-run content.

use std::collections::BTreeMap;

use crate::store::AppState;
use crate::types::*;

pub const INITIAL_BALANCE: f64 = 10_000.0;
pub const DEFAULT_CHAT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_WORLD_MODEL: &str = "gemini-3-flash-preview";

const HOUR_MS: Millis = 3_600_000;

pub fn initial_characters() -> Vec<Character> {
    vec![
        Character {
            avatar: "https://picsum.photos/seed/shenyi/200/200".into(),
            preferences: "喜欢清茶、古典乐、雨天。讨厌嘈杂和背叛。".into(),
            storyline: "目前由于一次项目竞争，你们处于某种微妙的博弈关系中，但他的话语间似乎带着某种怀旧。".into(),
            proactive_ticketing: true,
            ..Character::new("char1", "沈逸 (Shen Yi)")
                .with_background("冷淡而深情的跨国企业总裁，与你在商业晚宴上初遇。")
        },
        Character {
            avatar: "https://picsum.photos/seed/linqian/200/200".into(),
            preferences: "喜欢可乐、电子游戏、深夜代码。讨厌繁琐的社交规则。".into(),
            storyline: "她最近在帮你调查一个神秘包裹的来源。".into(),
            weibo_frequency: Frequency::High,
            ..Character::new("char2", "林浅 (Lin Qian)")
                .with_background("古灵精怪的天才黑客，是你的童年玩伴，也是你最可靠的秘密支持者。")
        },
    ]
}

pub fn initial_world(now: Millis) -> WorldState {
    WorldState {
        world_description: "一个近未来的都市，科技高度发达但社会贫富差距显著。由于神秘物质的出现，世界正处于能源革命的前夕。".into(),
        current_date: "2025-05-15".into(),
        news: vec![NewsItem {
            id: "news1".into(),
            title: "极光能源今日宣布突破性进展".into(),
            content: "该技术有望将全球电力成本降低30%...".into(),
            category: "科技".into(),
            timestamp: now,
        }],
        tickets: vec![
            Ticket {
                id: "t1".into(),
                title: "张杰 2025 全球巡演 - 上海站".into(),
                date: "2025-08-20".into(),
                price: 1280.0,
                category: TicketCategory::Concert,
                image: "https://picsum.photos/seed/concert1/300/400".into(),
                is_purchased: false,
            },
            Ticket {
                id: "t2".into(),
                title: "赛博朋克 2077: 电影版".into(),
                date: "2025-06-01".into(),
                price: 90.0,
                category: TicketCategory::Movie,
                image: "https://picsum.photos/seed/movie1/300/400".into(),
                is_purchased: false,
            },
        ],
        hot_searches: vec![
            hot("h1", "极光能源突破性进展", "450w", HotTag::Boom),
            hot("h2", "沈氏集团年度晚宴", "220w", HotTag::Hot),
            hot("h3", "赛博咖啡馆新品上市", "110w", HotTag::New),
        ],
        enable_moments_interaction: true,
        max_moment_replies: 4,
    }
}

fn hot(id: &str, title: &str, hotness: &str, tag: HotTag) -> HotSearchItem {
    HotSearchItem {
        id: id.into(),
        title: title.into(),
        hotness: hotness.into(),
        tag: Some(tag),
    }
}

pub fn initial_posts(now: Millis) -> Vec<SocialPost> {
    let post = |id: &str, author: &str, content: &str, images: &[&str], hours_ago: i64, likes| {
        let mut p = SocialPost::new(author, content, Platform::Moments, now - HOUR_MS * hours_ago);
        p.id = id.to_string();
        p.images = images.iter().map(|s| s.to_string()).collect();
        p.likes = likes;
        p
    };

    vec![
        post(
            "post1",
            "char1",
            "晚宴后的露台，晚风有些冷。商业博弈固然有趣，但有时也让人疲惫。想起某人的茶，或许那才是解药。",
            &["https://images.unsplash.com/photo-1514362545857-3bc16c4c7d1b?q=80&w=400"],
            2,
            12,
        ),
        post(
            "post2",
            "char2",
            "新的防火墙很有趣，但在我面前撑不过三分钟。😏 顺便提一句，那个包裹的地址指向了一个很有趣的地方...准备好出发了吗？",
            &[
                "https://images.unsplash.com/photo-1550751827-4bd374c3f58b?q=80&w=400",
                "https://images.unsplash.com/photo-1563986768609-322da13575f3?q=80&w=400",
            ],
            5,
            24,
        ),
        post(
            "post3",
            USER_ID,
            "今天的天气不错，适合在模拟器里发发呆。☕️",
            &["https://images.unsplash.com/photo-1495474472287-4d71bcdd2085?q=80&w=400"],
            24,
            5,
        ),
    ]
}

pub fn default_user() -> UserProfile {
    UserProfile {
        name: "我".into(),
        wechat_id: "wxid_pocket".into(),
        avatar: "https://picsum.photos/seed/me/200/200".into(),
        persona: String::new(),
    }
}

pub fn default_api_config() -> ApiConfig {
    ApiConfig {
        chat: ApiSettings::new(DEFAULT_CHAT_MODEL),
        world: ApiSettings::new(DEFAULT_WORLD_MODEL),
        provider_keys: BTreeMap::new(),
    }
}

pub fn initial_state(now: Millis) -> AppState {
    AppState {
        characters: initial_characters(),
        world: initial_world(now),
        chats: BTreeMap::new(),
        moments: initial_posts(now),
        weibo: Vec::new(),
        user: default_user(),
        api: default_api_config(),
        balance: INITIAL_BALANCE,
    }
}
