use anyhow::{Context, Result};
use pocketverse_common::{now_millis, Message, MessageKind, StateEvent, USER_ID};
use pocketverse_world::assemble::reply_messages;
use pocketverse_world::ChatContext;
use tracing::info;

use crate::session::Session;

/// Append the user's message, generate the reply, then maybe refresh the storyline.
pub async fn send(session: &mut Session, character: &str, text: &str) -> Result<()> {
    let character = session.find_character(character)?.clone();
    let id = character.id.clone();
    let len_before_turn = session.state.history(&id).len();

    session.apply(StateEvent::MessageAppended {
        character_id: id.clone(),
        message: Message::from_user(text, now_millis()),
    })?;
    session.apply(StateEvent::ReplyStarted {
        character_id: id.clone(),
    })?;

    let segments = {
        let mut ctx = ChatContext::from_state(&session.state, &id)
            .with_context(|| format!("Character {id} disappeared"))?;
        // The prompt carries the new text separately.
        ctx.history = &ctx.history[..ctx.history.len().saturating_sub(1)];
        session.engine.generate_reply(&session.api, &ctx, text).await?
    };

    let replies = reply_messages(&id, segments, now_millis());
    for message in &replies {
        print_message(&character.name, message);
    }
    session.apply_all(replies.into_iter().map(|message| StateEvent::MessageAppended {
        character_id: id.clone(),
        message,
    }))?;
    session.apply_all([
        StateEvent::ReplyFinished {
            character_id: id.clone(),
        },
        StateEvent::SessionRead {
            character_id: id.clone(),
        },
    ])?;

    let summary = session
        .engine
        .maybe_summarize_storyline(
            &session.api,
            &character,
            session.state.history(&id),
            len_before_turn,
            &session.state.user,
        )
        .await?;
    if let Some(storyline) = summary {
        info!(character = %character.name, "Storyline updated");
        session.apply(StateEvent::StorylineUpdated {
            character_id: id,
            storyline,
        })?;
    }
    Ok(())
}

pub fn history(session: &Session, character: &str, last: usize) -> Result<()> {
    let character = session.find_character(character)?;
    let history = session.state.history(&character.id);
    let start = history.len().saturating_sub(last);
    for message in &history[start..] {
        let name = if message.is_from_user() {
            session.state.user.name.as_str()
        } else {
            character.name.as_str()
        };
        print_message(name, message);
    }
    Ok(())
}

pub fn transfer(session: &mut Session, character: &str, amount: f64) -> Result<()> {
    let id = session.find_character(character)?.id.clone();
    session.apply(StateEvent::MessageAppended {
        character_id: id,
        message: Message::transfer(USER_ID, amount, now_millis()),
    })?;
    println!("已转账 ¥{amount:.2}，余额 ¥{:.2}", session.state.balance);
    Ok(())
}

pub fn accept(session: &mut Session, character: &str, message_id: &str) -> Result<()> {
    let id = session.find_character(character)?.id.clone();
    session.apply(StateEvent::TransferReceived {
        character_id: id,
        message_id: message_id.to_string(),
    })?;
    println!("已收款，余额 ¥{:.2}", session.state.balance);
    Ok(())
}

pub async fn storyline(session: &mut Session, character: &str) -> Result<()> {
    let character = session.find_character(character)?.clone();
    let summary = session
        .engine
        .summarize_storyline(
            &session.api,
            &character,
            session.state.history(&character.id),
            &session.state.user,
        )
        .await?;
    match summary {
        Some(storyline) => {
            println!("{storyline}");
            session.apply(StateEvent::StorylineUpdated {
                character_id: character.id,
                storyline,
            })?;
        }
        None => println!("(剧情未更新)"),
    }
    Ok(())
}

pub(crate) fn print_message(name: &str, message: &Message) {
    match message.kind {
        MessageKind::Action => println!("  *{}*", message.text),
        MessageKind::Transfer => println!(
            "{name}: [转账 ¥{:.2} {}] ({})",
            message.amount.unwrap_or_default(),
            match message.status {
                Some(pocketverse_common::TransferStatus::Received) => "已收款",
                _ => "待收款",
            },
            message.id
        ),
        _ => println!("{name}: {}", message.text),
    }
}
