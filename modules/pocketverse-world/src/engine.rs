//! World and chat orchestration.
//!
//! `WorldEngine` holds no application state. Each operation takes the
//! context it needs, builds a prompt, makes one model call, normalizes the
//! result and returns plain entities for the caller to merge.

use std::ops::ControlFlow;
use std::sync::Arc;

use ai_client::ModelResolver;
use pocketverse_common::{
    now_millis, ApiConfig, AppState, Character, Comment, HotSearchItem, Message, Millis,
    NewsItem, Platform, Purpose, SocialPost, Ticket, TicketCategory, UserProfile, WorldState,
};
use tracing::{debug, info, warn};

use crate::assemble;
use crate::error::WorldResult;
use crate::normalize::{self, Roster};
use crate::pacing::{FixedDelay, Pacer};
use crate::pipeline::{PipelineReport, Stage, StageOutput, FULL_REFRESH_STAGES, WEIBO_STAGES};
use crate::prompts::{self, ChatContext, Prompt};
use crate::responses::ReplySegment;
use crate::storyline::StorylinePolicy;

/// Shared context for world-level generation.
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a> {
    pub api: &'a ApiConfig,
    pub world: &'a WorldState,
    pub roster: &'a [Character],
    pub user: &'a UserProfile,
}

impl<'a> WorldView<'a> {
    pub fn from_state(state: &'a AppState) -> Self {
        Self {
            api: &state.api,
            world: &state.world,
            roster: &state.characters,
            user: &state.user,
        }
    }
}

pub struct WorldEngine {
    resolver: Arc<dyn ModelResolver>,
    pacer: Arc<dyn Pacer>,
    storyline: StorylinePolicy,
}

impl WorldEngine {
    pub fn new(resolver: Arc<dyn ModelResolver>) -> Self {
        Self {
            resolver,
            pacer: Arc::new(FixedDelay::default()),
            storyline: StorylinePolicy::default(),
        }
    }

    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn with_storyline_policy(mut self, policy: StorylinePolicy) -> Self {
        self.storyline = policy;
        self
    }

    pub fn storyline_policy(&self) -> StorylinePolicy {
        self.storyline
    }

    /// One model call. `Ok(None)` means the provider failed and the caller
    /// should use its fallback; `Err` means the call could not be configured.
    async fn invoke(
        &self,
        api: &ApiConfig,
        purpose: Purpose,
        prompt: &Prompt,
        operation: &'static str,
    ) -> WorldResult<Option<String>> {
        let settings = api.settings(purpose);
        let model = self
            .resolver
            .resolve(&settings.model, api.credentials(purpose))?;

        debug!(
            operation,
            model = %settings.model,
            provider = model.provider(),
            structured = prompt.schema.is_some(),
            "Calling model"
        );
        match model.complete(&prompt.request(&settings.model)).await {
            Ok(text) => Ok(Some(text)),
            Err(e) => {
                warn!(operation, model = %settings.model, error = %e, "Generation failed, using fallback");
                Ok(None)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Chat
    // -----------------------------------------------------------------------

    /// Reply segments for `user_text`. Never empty.
    pub async fn generate_reply(
        &self,
        api: &ApiConfig,
        ctx: &ChatContext<'_>,
        user_text: &str,
    ) -> WorldResult<Vec<ReplySegment>> {
        let prompt = prompts::chat_reply_prompt(ctx, user_text);
        let segments = match self.invoke(api, Purpose::Chat, &prompt, "chat_reply").await? {
            Some(raw) => normalize::chat_segments(&raw),
            None => normalize::silence(),
        };
        info!(character = %ctx.character.name, segments = segments.len(), "Generated reply");
        Ok(segments)
    }

    /// [`generate_reply`](Self::generate_reply) as chat messages starting at `start`.
    pub async fn reply_messages(
        &self,
        api: &ApiConfig,
        ctx: &ChatContext<'_>,
        user_text: &str,
        start: Millis,
    ) -> WorldResult<Vec<Message>> {
        let segments = self.generate_reply(api, ctx, user_text).await?;
        Ok(assemble::reply_messages(&ctx.character.id, segments, start))
    }

    /// Storyline summary, only when the turn that grew the history from
    /// `len_before_turn` messages crossed a sampling boundary.
    pub async fn maybe_summarize_storyline(
        &self,
        api: &ApiConfig,
        character: &Character,
        history: &[Message],
        len_before_turn: usize,
        user: &UserProfile,
    ) -> WorldResult<Option<String>> {
        if !self.storyline.should_summarize(len_before_turn, history.len()) {
            return Ok(None);
        }
        self.summarize_storyline(api, character, history, user).await
    }

    /// A new storyline paragraph, or `None` when generation produced nothing.
    pub async fn summarize_storyline(
        &self,
        api: &ApiConfig,
        character: &Character,
        history: &[Message],
        user: &UserProfile,
    ) -> WorldResult<Option<String>> {
        let prompt = prompts::storyline_prompt(character, history, user);
        let summary = self
            .invoke(api, Purpose::Chat, &prompt, "storyline")
            .await?
            .and_then(|raw| normalize::storyline(&raw));
        info!(character = %character.name, updated = summary.is_some(), "Summarized storyline");
        Ok(summary)
    }

    // -----------------------------------------------------------------------
    // World feeds
    // -----------------------------------------------------------------------

    pub async fn refresh_news(
        &self,
        view: &WorldView<'_>,
        category: Option<&str>,
    ) -> WorldResult<Vec<NewsItem>> {
        let prompt = prompts::news_prompt(view.world, category);
        let items = self
            .invoke(view.api, Purpose::World, &prompt, "news")
            .await?
            .map(|raw| normalize::news(&raw))
            .unwrap_or_default();
        info!(count = items.len(), "Refreshed news");
        Ok(assemble::news_items(items, now_millis()))
    }

    pub async fn refresh_hot_searches(&self, view: &WorldView<'_>) -> WorldResult<Vec<HotSearchItem>> {
        let prompt = prompts::hot_searches_prompt(view.world);
        let items = self
            .invoke(view.api, Purpose::World, &prompt, "hot_searches")
            .await?
            .map(|raw| normalize::hot_searches(&raw))
            .unwrap_or_default();
        info!(count = items.len(), "Refreshed hot searches");
        Ok(assemble::hot_search_items(items))
    }

    /// New tickets. `category` is passed to the model as a preference only.
    pub async fn refresh_tickets(
        &self,
        view: &WorldView<'_>,
        category: Option<TicketCategory>,
    ) -> WorldResult<Vec<Ticket>> {
        let prompt = prompts::tickets_prompt(view.world, category);
        let items = self
            .invoke(view.api, Purpose::World, &prompt, "tickets")
            .await?
            .map(|raw| normalize::tickets(&raw))
            .unwrap_or_default();
        info!(count = items.len(), "Refreshed tickets");
        Ok(assemble::ticket_items(items))
    }

    // -----------------------------------------------------------------------
    // Social feeds
    // -----------------------------------------------------------------------

    /// Posts by roster characters whose posting frequency on `platform` is
    /// not `none`. No call is made when nobody is eligible.
    pub async fn refresh_roster_posts(
        &self,
        view: &WorldView<'_>,
        platform: Platform,
    ) -> WorldResult<Vec<SocialPost>> {
        let authors = prompts::eligible_authors(view.roster, platform);
        if authors.is_empty() {
            info!(platform = platform.display_name(), "No eligible authors, skipping");
            return Ok(Vec::new());
        }

        let prompt = prompts::roster_posts_prompt(view.world, &authors, platform);
        let roster = Roster::new(authors);
        let items = self
            .invoke(view.api, Purpose::World, &prompt, "roster_posts")
            .await?
            .map(|raw| normalize::roster_posts(&raw, &roster))
            .unwrap_or_default();
        info!(platform = platform.display_name(), count = items.len(), "Refreshed roster posts");
        Ok(assemble::roster_post_items(items, &roster, platform, now_millis()))
    }

    pub async fn refresh_moments(&self, view: &WorldView<'_>) -> WorldResult<Vec<SocialPost>> {
        self.refresh_roster_posts(view, Platform::Moments).await
    }

    /// Recommended weibo posts by invented authors.
    pub async fn refresh_recommended_posts(
        &self,
        view: &WorldView<'_>,
    ) -> WorldResult<Vec<SocialPost>> {
        let prompt = prompts::virtual_posts_prompt(view.world);
        let items = self
            .invoke(view.api, Purpose::World, &prompt, "recommended_posts")
            .await?
            .map(|raw| normalize::virtual_posts(&raw))
            .unwrap_or_default();
        info!(count = items.len(), "Refreshed recommended posts");
        Ok(assemble::virtual_post_items(items, now_millis()))
    }

    /// Comments from roster characters on `post`, at most `max_replies`.
    pub async fn generate_interactions(
        &self,
        view: &WorldView<'_>,
        post: &SocialPost,
        max_replies: usize,
    ) -> WorldResult<Vec<Comment>> {
        if max_replies == 0 || view.roster.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = prompts::interactions_prompt(post, view.roster, view.world, view.user, max_replies);
        let roster = Roster::new(view.roster);
        let items = self
            .invoke(view.api, Purpose::World, &prompt, "interactions")
            .await?
            .map(|raw| normalize::interactions(&raw, &roster, max_replies))
            .unwrap_or_default();
        info!(post_id = %post.id, count = items.len(), "Generated interactions");
        Ok(assemble::comment_items(items, &roster, now_millis()))
    }

    /// Interactions for a newly created or commented post, following the
    /// world's toggle and per-post cap.
    pub async fn auto_interactions(
        &self,
        view: &WorldView<'_>,
        post: &SocialPost,
    ) -> WorldResult<Vec<Comment>> {
        if !view.world.enable_moments_interaction {
            debug!(post_id = %post.id, "Automatic interactions disabled");
            return Ok(Vec::new());
        }
        self.generate_interactions(view, post, view.world.max_moment_replies as usize)
            .await
    }

    // -----------------------------------------------------------------------
    // Pipelines
    // -----------------------------------------------------------------------

    /// Recommended posts, roster posts, then hot searches, pausing between stages.
    pub async fn refresh_weibo(&self, view: &WorldView<'_>) -> WorldResult<PipelineReport> {
        self.run_pipeline(&WEIBO_STAGES, view, |_| ControlFlow::Continue(()))
            .await
    }

    /// News, tickets, the weibo stages, then moments, pausing between stages.
    ///
    /// `on_stage` sees each stage's output as soon as it is ready; returning
    /// `ControlFlow::Break` skips the remaining stages.
    pub async fn refresh_everything<F>(
        &self,
        view: &WorldView<'_>,
        on_stage: F,
    ) -> WorldResult<PipelineReport>
    where
        F: FnMut(&StageOutput) -> ControlFlow<()>,
    {
        self.run_pipeline(&FULL_REFRESH_STAGES, view, on_stage).await
    }

    async fn run_pipeline<F>(
        &self,
        stages: &[Stage],
        view: &WorldView<'_>,
        mut on_stage: F,
    ) -> WorldResult<PipelineReport>
    where
        F: FnMut(&StageOutput) -> ControlFlow<()>,
    {
        let mut report = PipelineReport::default();
        for (i, stage) in stages.iter().copied().enumerate() {
            if i > 0 {
                self.pacer.pause(stage).await;
            }

            let output = self.run_stage(stage, view).await?;
            info!(%stage, items = output.len(), "Stage complete");
            let flow = on_stage(&output);
            report.outputs.push(output);

            if flow.is_break() && i + 1 < stages.len() {
                info!(%stage, remaining = stages.len() - i - 1, "Pipeline stopped by caller");
                report.stopped_early = true;
                break;
            }
        }
        Ok(report)
    }

    async fn run_stage(&self, stage: Stage, view: &WorldView<'_>) -> WorldResult<StageOutput> {
        Ok(match stage {
            Stage::News => StageOutput::News(self.refresh_news(view, None).await?),
            Stage::Tickets => StageOutput::Tickets(self.refresh_tickets(view, None).await?),
            Stage::RecommendedPosts => {
                StageOutput::RecommendedPosts(self.refresh_recommended_posts(view).await?)
            }
            Stage::WeiboPosts => {
                StageOutput::WeiboPosts(self.refresh_roster_posts(view, Platform::Weibo).await?)
            }
            Stage::HotSearches => StageOutput::HotSearches(self.refresh_hot_searches(view).await?),
            Stage::MomentsPosts => StageOutput::MomentsPosts(self.refresh_moments(view).await?),
        })
    }
}
