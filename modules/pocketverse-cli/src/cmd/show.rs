use pocketverse_common::{
    AppState, Character, HotSearchItem, HotTag, NewsItem, Platform, SocialPost, Ticket,
};

use crate::args::ShowArg;
use crate::session::Session;

pub fn print(session: &Session, what: ShowArg) {
    let state = &session.state;
    match what {
        ShowArg::Characters => state.characters.iter().for_each(print_character),
        ShowArg::World => {
            println!("日期: {}", state.world.current_date);
            println!("世界观: {}", state.world.world_description);
            println!(
                "自动互动: {} (每条最多 {} 条评论)",
                if state.world.enable_moments_interaction { "开" } else { "关" },
                state.world.max_moment_replies
            );
            println!("聊天模型: {}", session.api.chat.model);
            println!("世界模型: {}", session.api.world.model);
        }
        ShowArg::News => print_news(&state.world.news),
        ShowArg::Hot => print_hot_searches(&state.world.hot_searches),
        ShowArg::Tickets => print_tickets(&state.world.tickets),
        ShowArg::Moments => print_posts(state, state.posts(Platform::Moments)),
        ShowArg::Weibo => print_posts(state, state.posts(Platform::Weibo)),
        ShowArg::Chats => {
            for character in &state.characters {
                let Some(chat) = state.session(&character.id) else {
                    continue;
                };
                let preview = chat.last_message().map(|m| m.text.as_str()).unwrap_or_default();
                println!(
                    "{} [{} 未读] {}",
                    character.name,
                    chat.unread_count,
                    preview.chars().take(30).collect::<String>()
                );
            }
        }
        ShowArg::Wallet => {
            println!("余额 ¥{:.2}", state.balance);
            for ticket in state.world.tickets.iter().filter(|t| t.is_purchased) {
                println!("  已购: {} ({})", ticket.title, ticket.date);
            }
        }
    }
}

fn print_character(character: &Character) {
    let fav = if character.is_favorite { " ★" } else { "" };
    println!("{} ({}){fav}", character.name, character.id);
    if !character.background.trim().is_empty() {
        println!("  {}", character.background);
    }
    println!(
        "  朋友圈: {}  微博: {}",
        character.moments_frequency.describe(),
        character.weibo_frequency.describe()
    );
}

pub(crate) fn print_news(items: &[NewsItem]) {
    for item in items {
        println!("[{}] {}", item.category, item.title);
        println!("  {}", item.content);
    }
}

pub(crate) fn print_hot_searches(items: &[HotSearchItem]) {
    for (rank, item) in items.iter().enumerate() {
        let tag = match item.tag {
            Some(HotTag::Hot) => " 热",
            Some(HotTag::New) => " 新",
            Some(HotTag::Boom) => " 爆",
            Some(HotTag::Recommended) => " 荐",
            None => "",
        };
        println!("{:>2}. {} {}{tag}", rank + 1, item.title, item.hotness);
    }
}

pub(crate) fn print_tickets(tickets: &[Ticket]) {
    for ticket in tickets {
        let status = if ticket.is_purchased { "已购" } else { "在售" };
        println!(
            "{} [{}] {} ¥{:.2} {status} ({})",
            ticket.date,
            ticket.category.as_str(),
            ticket.title,
            ticket.price,
            ticket.id
        );
    }
}

pub(crate) fn print_posts(state: &AppState, posts: &[SocialPost]) {
    for post in posts {
        print_post(state, post);
    }
}

pub(crate) fn print_post(state: &AppState, post: &SocialPost) {
    let author = post.author_display_name(&state.characters, &state.user);
    let liked = if post.liked_by_me { "♥" } else { "♡" };
    println!("{author}: {} ({})", post.content, post.id);
    println!("  {liked} {}", post.likes);
    for comment in &post.comments {
        match &comment.reply_to_name {
            Some(to) => println!("  {} 回复 {to}: {}", comment.author_name, comment.content),
            None => println!("  {}: {}", comment.author_name, comment.content),
        }
    }
}
