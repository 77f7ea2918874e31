use pocketverse_common::{Character, Platform, SocialPost, UserProfile, WorldState};

use super::{or_placeholder, roster_block, Prompt};
use crate::responses::{InteractionsResponse, RosterPostsResponse, VirtualPostsResponse};

const MAX_ROSTER_POSTS: usize = 3;
const VIRTUAL_POSTS: usize = 3;

/// Characters allowed to post on `platform`. A posting frequency of
/// `none` removes a character from that platform's author list.
pub fn eligible_authors(roster: &[Character], platform: Platform) -> Vec<&Character> {
    roster
        .iter()
        .filter(|c| c.frequency_on(platform).is_enabled())
        .collect()
}

fn social_system(world: &WorldState, platform: Platform) -> String {
    format!(
        "你在模拟一个虚构世界里的{}。\n\n【世界观】\n{}\n\n【今天】{}",
        platform.display_name(),
        or_placeholder(&world.world_description),
        world.current_date,
    )
}

/// Posts written by roster characters. `authors` should already be filtered
/// with [`eligible_authors`]; the prompt lists them as the only valid names.
pub fn roster_posts_prompt(
    world: &WorldState,
    authors: &[&Character],
    platform: Platform,
) -> Prompt {
    let count = authors.len().clamp(1, MAX_ROSTER_POSTS);
    let mut user = format!(
        "请为下列角色生成 1 到 {count} 条{}动态。\n\n【可用的作者】\n{}",
        platform.display_name(),
        roster_block(authors, true),
    );
    user.push_str("\n\n【发帖频率】");
    for c in authors {
        user.push_str(&format!("\n- {}: {}", c.name, c.frequency_on(platform).describe()));
    }
    user.push_str(
        "\n\n【规则】\n\
authorName 必须与上面列表中的某个名字完全一致，不能使用任何其他名字。\n\
不要编造匿名用户、路人、网友或任何列表之外的作者。\n\
发帖频率越高的角色越可能发帖；内容要符合各自的背景和口吻，简短生活化。",
    );
    Prompt::structured::<RosterPostsResponse>(social_system(world, platform), user)
}

/// Filler posts by invented influencers. No roster constraint.
pub fn virtual_posts_prompt(world: &WorldState) -> Prompt {
    let user = format!(
        "请生成 {VIRTUAL_POSTS} 条微博推荐流里的热门帖子，作者是这个世界里虚构的网红、博主或官方账号。\n\
每条包含 authorName（昵称）、authorAvatar（头像 URL，使用 https://picsum.photos/seed/<英文关键词>/100/100 的格式）、content（正文）。\n\
内容可以呼应当下的新闻和热搜，风格多样。",
    );
    Prompt::structured::<VirtualPostsResponse>(social_system(world, Platform::Weibo), user)
}

/// Comments from roster characters on one post, capped at `max_replies`.
pub fn interactions_prompt(
    post: &SocialPost,
    roster: &[Character],
    world: &WorldState,
    user: &UserProfile,
    max_replies: usize,
) -> Prompt {
    let author = post.author_display_name(roster, user);
    let commenters: Vec<&Character> = roster.iter().collect();

    let mut turn = format!(
        "【帖子】\n作者: {author}\n内容: {}",
        post.content
    );
    if !post.comments.is_empty() {
        turn.push_str("\n\n【已有评论】");
        for comment in &post.comments {
            match &comment.reply_to_name {
                Some(to) => turn.push_str(&format!(
                    "\n- {} 回复 {}: {}",
                    comment.author_name, to, comment.content
                )),
                None => turn.push_str(&format!("\n- {}: {}", comment.author_name, comment.content)),
            }
        }
    }
    turn.push_str(&format!(
        "\n\n【可以评论的角色】\n{}\n\n【规则】\n\
最多生成 {max_replies} 条评论。\n\
authorName 必须与上面列表中的某个名字完全一致，不能使用任何其他名字，不要编造匿名用户或路人。\n\
如果某条评论是在回复之前的评论者，用 replyToName 写出对方的名字，且这个名字也必须来自上面的列表；否则省略 replyToName。\n\
评论要符合角色与作者 {author} 之间的关系，简短口语化。",
        roster_block(&commenters, true),
    ));

    Prompt::structured::<InteractionsResponse>(social_system(world, post.platform), turn)
}
