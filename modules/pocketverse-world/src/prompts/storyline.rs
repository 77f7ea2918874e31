use pocketverse_common::{Character, Message, UserProfile};

use super::{format_history, or_placeholder, Prompt, HISTORY_WINDOW};

/// Free-text summary that replaces the character's storyline field.
pub fn storyline_prompt(character: &Character, history: &[Message], user: &UserProfile) -> Prompt {
    let system = "你是一名剧情记录员，负责用简洁的中文概括角色与用户之间的关系进展。\
只输出总结正文，不要加标题、引号或任何解释。"
        .to_string();

    let mut turn = format!(
        "角色: {}\n背景: {}\n之前的剧情: {}\n用户: {}",
        character.name,
        or_placeholder(&character.background),
        or_placeholder(&character.storyline),
        user.name,
    );
    if character.perceive_user_persona && !user.persona.trim().is_empty() {
        turn.push_str(&format!("\n用户人设: {}", user.persona));
    }
    turn.push_str(&format!(
        "\n\n【最近的聊天】\n{}\n\n请用不超过 100 字总结 {} 和 {} 目前的剧情进展。",
        format_history(history, &character.name, HISTORY_WINDOW),
        character.name,
        user.name,
    ));

    Prompt::text(system, turn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storyline_prompt_is_free_text_with_history() {
        let mut character = Character::new("c1", "沈逸");
        character.storyline = "初次见面".into();
        let user = UserProfile {
            name: "阿远".into(),
            wechat_id: String::new(),
            avatar: String::new(),
            persona: "夜猫子".into(),
        };
        let history = vec![Message::from_user("明天见", 1)];

        let prompt = storyline_prompt(&character, &history, &user);
        assert!(prompt.schema.is_none());
        assert!(prompt.user.contains("初次见面"));
        assert!(prompt.user.contains("用户: 明天见"));
        assert!(prompt.user.contains("夜猫子"));

        character.perceive_user_persona = false;
        assert!(!storyline_prompt(&character, &history, &user).user.contains("夜猫子"));
    }
}
