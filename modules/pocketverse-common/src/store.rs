//! The client-side state container and its reducer.
//!
//! Every mutation goes through [`AppState::apply`]. Generation code never
//! touches `AppState`; it returns new entities which callers wrap in a
//! [`StateEvent`].

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::types::*;

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub characters: Vec<Character>,
    pub world: WorldState,
    pub chats: BTreeMap<String, ChatSession>,
    pub moments: Vec<SocialPost>,
    pub weibo: Vec<SocialPost>,
    pub user: UserProfile,
    pub api: ApiConfig,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    // Roster and profile
    CharacterAdded(Character),
    CharacterUpdated(Character),
    CharacterRemoved { character_id: String },
    StorylineUpdated { character_id: String, storyline: String },
    UserProfileUpdated(UserProfile),
    ApiConfigUpdated(ApiConfig),

    // World settings
    WorldDescriptionUpdated { description: String },
    CurrentDateSet { date: String },
    InteractionSettingsUpdated { enabled: bool, max_replies: u32 },

    // Chat
    MessageAppended { character_id: String, message: Message },
    ReplyStarted { character_id: String },
    ReplyFinished { character_id: String },
    SessionRead { character_id: String },
    TransferReceived { character_id: String, message_id: String },

    // Feeds
    NewsPublished(Vec<NewsItem>),
    HotSearchesReplaced(Vec<HotSearchItem>),
    TicketsListed(Vec<Ticket>),
    TicketPurchased { ticket_id: String },
    PostsPublished(Vec<SocialPost>),
    PostLikeToggled { post_id: String },
    CommentsAdded { post_id: String, comments: Vec<Comment> },
}

impl AppState {
    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn session(&self, character_id: &str) -> Option<&ChatSession> {
        self.chats.get(character_id)
    }

    /// Messages exchanged with a character, oldest first.
    pub fn history(&self, character_id: &str) -> &[Message] {
        self.chats
            .get(character_id)
            .map(|s| s.messages.as_slice())
            .unwrap_or_default()
    }

    pub fn posts(&self, platform: Platform) -> &[SocialPost] {
        match platform {
            Platform::Moments => &self.moments,
            Platform::Weibo => &self.weibo,
        }
    }

    pub fn post(&self, post_id: &str) -> Option<&SocialPost> {
        self.moments
            .iter()
            .chain(self.weibo.iter())
            .find(|p| p.id == post_id)
    }

    fn post_mut(&mut self, post_id: &str) -> StoreResult<&mut SocialPost> {
        self.moments
            .iter_mut()
            .chain(self.weibo.iter_mut())
            .find(|p| p.id == post_id)
            .ok_or_else(|| StoreError::UnknownPost(post_id.to_string()))
    }

    fn character_mut(&mut self, id: &str) -> StoreResult<&mut Character> {
        self.characters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::UnknownCharacter(id.to_string()))
    }

    /// Session for a roster character, created on first use.
    fn session_mut(&mut self, character_id: &str) -> StoreResult<&mut ChatSession> {
        if self.character(character_id).is_none() {
            return Err(StoreError::UnknownCharacter(character_id.to_string()));
        }
        Ok(self
            .chats
            .entry(character_id.to_string())
            .or_insert_with(|| ChatSession::new(character_id)))
    }

    fn spend(&mut self, amount: f64) -> StoreResult<()> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(StoreError::InvalidAmount(amount));
        }
        if self.balance < amount {
            return Err(StoreError::InsufficientBalance {
                needed: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Apply one event. A rejected event leaves the state unchanged.
    pub fn apply(&mut self, event: &StateEvent) -> StoreResult<()> {
        match event {
            StateEvent::CharacterAdded(character) => {
                if self.character(&character.id).is_some() {
                    return Err(StoreError::DuplicateCharacter(character.id.clone()));
                }
                self.characters.push(character.clone());
            }
            StateEvent::CharacterUpdated(character) => {
                *self.character_mut(&character.id)? = character.clone();
            }
            StateEvent::CharacterRemoved { character_id } => {
                let before = self.characters.len();
                self.characters.retain(|c| &c.id != character_id);
                if self.characters.len() == before {
                    return Err(StoreError::UnknownCharacter(character_id.clone()));
                }
                self.chats.remove(character_id);
            }
            StateEvent::StorylineUpdated {
                character_id,
                storyline,
            } => {
                self.character_mut(character_id)?.storyline = storyline.clone();
            }
            StateEvent::UserProfileUpdated(user) => self.user = user.clone(),
            StateEvent::ApiConfigUpdated(api) => self.api = api.clone(),

            StateEvent::WorldDescriptionUpdated { description } => {
                self.world.world_description = description.clone();
            }
            StateEvent::CurrentDateSet { date } => self.world.current_date = date.clone(),
            StateEvent::InteractionSettingsUpdated {
                enabled,
                max_replies,
            } => {
                self.world.enable_moments_interaction = *enabled;
                self.world.max_moment_replies = *max_replies;
            }

            StateEvent::MessageAppended {
                character_id,
                message,
            } => self.append_message(character_id, message.clone())?,
            StateEvent::ReplyStarted { character_id } => self.set_typing(character_id, true)?,
            StateEvent::ReplyFinished { character_id } => self.set_typing(character_id, false)?,
            StateEvent::SessionRead { character_id } => {
                let session = self.session_mut(character_id)?;
                if session.unread_count > 0 {
                    session.unread_count = 0;
                    session.revision += 1;
                }
            }
            StateEvent::TransferReceived {
                character_id,
                message_id,
            } => {
                let session = self.session_mut(character_id)?;
                let message = session
                    .messages
                    .iter_mut()
                    .find(|m| {
                        &m.id == message_id && m.kind == MessageKind::Transfer && !m.is_from_user()
                    })
                    .ok_or_else(|| StoreError::UnknownMessage {
                        character_id: character_id.clone(),
                        message_id: message_id.clone(),
                    })?;
                // Crediting happens once; a second accept is a no-op.
                if message.status == Some(TransferStatus::Received) {
                    return Ok(());
                }
                message.status = Some(TransferStatus::Received);
                let amount = message.amount.unwrap_or_default();
                session.revision += 1;
                self.balance += amount;
            }

            StateEvent::NewsPublished(items) => {
                let mut news = items.clone();
                news.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                news.append(&mut self.world.news);
                self.world.news = news;
            }
            StateEvent::HotSearchesReplaced(items) => self.world.hot_searches = items.clone(),
            StateEvent::TicketsListed(tickets) => {
                let known: HashSet<&str> =
                    self.world.tickets.iter().map(|t| t.id.as_str()).collect();
                let mut fresh: Vec<Ticket> = tickets
                    .iter()
                    .filter(|t| !known.contains(t.id.as_str()))
                    .cloned()
                    .map(|mut t| {
                        t.is_purchased = false;
                        t
                    })
                    .collect();
                fresh.append(&mut self.world.tickets);
                self.world.tickets = fresh;
            }
            StateEvent::TicketPurchased { ticket_id } => self.purchase_ticket(ticket_id)?,
            StateEvent::PostsPublished(posts) => {
                for platform in [Platform::Moments, Platform::Weibo] {
                    let mut fresh: Vec<SocialPost> = posts
                        .iter()
                        .filter(|p| p.platform == platform)
                        .cloned()
                        .collect();
                    if fresh.is_empty() {
                        continue;
                    }
                    let feed = match platform {
                        Platform::Moments => &mut self.moments,
                        Platform::Weibo => &mut self.weibo,
                    };
                    fresh.append(feed);
                    *feed = fresh;
                }
            }
            StateEvent::PostLikeToggled { post_id } => {
                let post = self.post_mut(post_id)?;
                if post.liked_by_me {
                    post.likes = post.likes.saturating_sub(1);
                } else {
                    post.likes += 1;
                }
                post.liked_by_me = !post.liked_by_me;
                post.revision += 1;
            }
            StateEvent::CommentsAdded { post_id, comments } => {
                let post = self.post_mut(post_id)?;
                post.comments.extend(comments.iter().cloned());
                post.revision += 1;
            }
        }
        Ok(())
    }

    fn append_message(&mut self, character_id: &str, mut message: Message) -> StoreResult<()> {
        if message.kind == MessageKind::Transfer && message.is_from_user() {
            let amount = message.amount.unwrap_or_default();
            // Checked before touching the session so a rejected transfer leaves no trace.
            if self.character(character_id).is_none() {
                return Err(StoreError::UnknownCharacter(character_id.to_string()));
            }
            self.spend(amount)?;
        }

        let session = self.session_mut(character_id)?;

        // Timestamps within a conversation never go backwards.
        if let Some(last) = session.messages.last() {
            if message.timestamp < last.timestamp {
                debug!(
                    character_id,
                    requested = message.timestamp,
                    clamped = last.timestamp,
                    "Clamped out-of-order message timestamp"
                );
                message.timestamp = last.timestamp;
            }
        }

        if !message.is_from_user() {
            session.unread_count += 1;
        }
        session.last_message_at = session.last_message_at.max(message.timestamp);
        session.messages.push(message);
        session.revision += 1;
        Ok(())
    }

    fn set_typing(&mut self, character_id: &str, typing: bool) -> StoreResult<()> {
        let session = self.session_mut(character_id)?;
        if session.is_typing != typing {
            session.is_typing = typing;
            session.revision += 1;
        }
        Ok(())
    }

    fn purchase_ticket(&mut self, ticket_id: &str) -> StoreResult<()> {
        let ticket = self
            .world
            .tickets
            .iter()
            .find(|t| t.id == ticket_id)
            .ok_or_else(|| StoreError::UnknownTicket(ticket_id.to_string()))?;
        if ticket.is_purchased {
            return Err(StoreError::AlreadyPurchased(ticket_id.to_string()));
        }
        let price = ticket.price;
        // Free events cost nothing; only paid ones go through the wallet.
        if price != 0.0 {
            self.spend(price)?;
        }

        if let Some(ticket) = self.world.tickets.iter_mut().find(|t| t.id == ticket_id) {
            ticket.is_purchased = true;
        }
        Ok(())
    }
}
