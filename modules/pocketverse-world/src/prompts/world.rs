use pocketverse_common::{HotTag, TicketCategory, WorldState};

use super::{or_placeholder, Prompt};
use crate::responses::{HotSearchResponse, NewsResponse, TicketResponse};

fn world_system(role: &str, world: &WorldState) -> String {
    format!(
        "你是{role}，负责为一个虚构世界生成内容。\n\n【世界观】\n{}\n\n【今天】{}\n\n\
所有内容必须贴合这个世界观，使用简体中文，不要出现现实中不存在于该世界的设定。",
        or_placeholder(&world.world_description),
        world.current_date,
    )
}

/// 2 to 3 news items, optionally restricted to a category.
pub fn news_prompt(world: &WorldState, category: Option<&str>) -> Prompt {
    let mut user = String::from("请生成 2 到 3 条今天的新闻。");
    match category.map(str::trim).filter(|c| !c.is_empty()) {
        Some(category) => user.push_str(&format!("\n所有新闻的类别都必须是「{category}」。")),
        None => user.push_str("\n类别可以是社会、科技、娱乐、财经、体育等，尽量多样。"),
    }
    if !world.news.is_empty() {
        user.push_str("\n不要与以下已有新闻重复:");
        for news in world.news.iter().take(5) {
            user.push_str(&format!("\n- {}", news.title));
        }
    }
    user.push_str("\n每条包含 title（标题）、content（一两句正文）、category（类别）。");

    Prompt::structured::<NewsResponse>(world_system("新闻编辑", world), user)
}

/// Five trending topics.
pub fn hot_searches_prompt(world: &WorldState) -> Prompt {
    let user = format!(
        "请生成 5 条当前的热搜话题。\n\
每条包含 title（话题）、hotness（热度，例如 \"356w\"）、可选的 tag（只能是 {}）。\n\
话题要像真实热搜一样简短、有吸引力。",
        HotTag::ALL.join("、"),
    );
    Prompt::structured::<HotSearchResponse>(world_system("热搜榜运营", world), user)
}

/// About two upcoming events. The category is a hint the model may ignore.
pub fn tickets_prompt(world: &WorldState, category: Option<TicketCategory>) -> Prompt {
    let categories: Vec<&str> = TicketCategory::ALL.iter().map(|c| c.as_str()).collect();
    let mut user = format!(
        "请生成 2 个即将在 {} 之后举行的活动票务信息。\n\
category 只能取以下值之一: {}。",
        world.current_date,
        categories.join(", "),
    );
    if let Some(category) = category {
        user.push_str(&format!("\n这次请优先生成 category 为 \"{}\" 的活动。", category.as_str()));
    }
    user.push_str(
        "\n每条包含 title（活动名）、date（YYYY-MM-DD）、price（人民币，数字）、category、\
image（海报图片 URL，使用 https://picsum.photos/seed/<英文关键词>/300/400 的格式）。",
    );
    Prompt::structured::<TicketResponse>(world_system("票务平台编辑", world), user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocketverse_common::seed;

    fn world() -> WorldState {
        let mut world = seed::initial_world(1_000);
        world.world_description = "蒸汽朋克风格的浮空城".into();
        world
    }

    #[test]
    fn every_world_prompt_carries_description() {
        let world = world();
        for prompt in [
            news_prompt(&world, None),
            hot_searches_prompt(&world),
            tickets_prompt(&world, None),
        ] {
            assert!(prompt.system.contains("蒸汽朋克风格的浮空城"));
            assert!(prompt.schema.is_some());
        }
    }

    #[test]
    fn news_category_filter_appears_in_user_turn() {
        let prompt = news_prompt(&world(), Some("体育"));
        assert!(prompt.user.contains("「体育」"));

        let blank = news_prompt(&world(), Some("  "));
        assert!(!blank.user.contains("「"));
    }

    #[test]
    fn news_prompt_lists_existing_headlines() {
        let world = world();
        let prompt = news_prompt(&world, None);
        assert!(prompt.user.contains(&world.news[0].title));
    }

    #[test]
    fn ticket_prompt_names_enum_and_hint() {
        let prompt = tickets_prompt(&world(), Some(TicketCategory::Concert));
        assert!(prompt.user.contains("concert, movie, theater, sports, exhibition"));
        assert!(prompt.user.contains("\"concert\""));
    }

    #[test]
    fn hot_search_prompt_lists_tags() {
        assert!(hot_searches_prompt(&world()).user.contains("热、新、爆、荐"));
    }
}
