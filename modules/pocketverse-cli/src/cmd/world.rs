use std::ops::ControlFlow;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use pocketverse_common::{StateEvent, TicketCategory};
use pocketverse_world::Stage;
use tracing::info;

use super::show::{print_hot_searches, print_news, print_tickets};
use crate::session::Session;

pub async fn news(session: &mut Session, category: Option<&str>) -> Result<()> {
    let items = session.engine.refresh_news(&session.view(), category).await?;
    if items.is_empty() {
        println!("(没有新的新闻)");
        return Ok(());
    }
    print_news(&items);
    session.apply(StateEvent::NewsPublished(items))
}

pub async fn hot(session: &mut Session) -> Result<()> {
    let items = session.engine.refresh_hot_searches(&session.view()).await?;
    if items.is_empty() {
        // Keep the old list rather than blanking it.
        println!("(热搜未更新)");
        return Ok(());
    }
    print_hot_searches(&items);
    session.apply(StateEvent::HotSearchesReplaced(items))
}

pub async fn tickets(session: &mut Session, category: Option<TicketCategory>) -> Result<()> {
    let tickets = session.engine.refresh_tickets(&session.view(), category).await?;
    if tickets.is_empty() {
        println!("(暂无新的演出)");
        return Ok(());
    }
    print_tickets(&tickets);
    session.apply(StateEvent::TicketsListed(tickets))
}

/// Run the full world refresh, optionally stopping once `stop_after` has run.
pub async fn refresh(session: &mut Session, stop_after: Option<Stage>) -> Result<()> {
    let report = session
        .engine
        .refresh_everything(&session.view(), |output| {
            println!("{:<18} {} 条", output.stage().to_string(), output.len());
            match stop_after {
                Some(stage) if stage == output.stage() => ControlFlow::Break(()),
                _ => ControlFlow::Continue(()),
            }
        })
        .await?;

    if report.stopped_early {
        info!(stages = report.outputs.len(), "Refresh stopped early");
    }
    session.apply_all(report.into_events())
}

pub fn buy(session: &mut Session, ticket_id: &str) -> Result<()> {
    session.apply(StateEvent::TicketPurchased {
        ticket_id: ticket_id.to_string(),
    })?;
    println!("购票成功，余额 ¥{:.2}", session.state.balance);
    Ok(())
}

#[derive(Debug, Default)]
pub struct Settings {
    pub world_description: Option<String>,
    pub date: Option<String>,
    pub interactions: Option<bool>,
    pub max_replies: Option<u32>,
    pub chat_model: Option<String>,
    pub world_model: Option<String>,
}

pub fn set(session: &mut Session, settings: Settings) -> Result<()> {
    let mut events = Vec::new();

    if let Some(description) = settings.world_description {
        events.push(StateEvent::WorldDescriptionUpdated { description });
    }
    if let Some(date) = settings.date {
        if NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
            bail!("Invalid date '{date}', expected YYYY-MM-DD");
        }
        events.push(StateEvent::CurrentDateSet { date });
    }
    if settings.interactions.is_some() || settings.max_replies.is_some() {
        let world = &session.state.world;
        events.push(StateEvent::InteractionSettingsUpdated {
            enabled: settings.interactions.unwrap_or(world.enable_moments_interaction),
            max_replies: settings.max_replies.unwrap_or(world.max_moment_replies),
        });
    }
    if settings.chat_model.is_some() || settings.world_model.is_some() {
        // Only the saved copy is updated so env keys never reach disk.
        let mut api = session.state.api.clone();
        if let Some(model) = settings.chat_model {
            session.api.chat.model = model.clone();
            api.chat.model = model;
        }
        if let Some(model) = settings.world_model {
            session.api.world.model = model.clone();
            api.world.model = model;
        }
        events.push(StateEvent::ApiConfigUpdated(api));
    }

    if events.is_empty() {
        println!("(没有需要修改的设置)");
        return Ok(());
    }
    info!(count = events.len(), "Settings updated");
    session.apply_all(events)
}
