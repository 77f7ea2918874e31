//! Fixed refresh pipelines and what each stage hands back.

use std::fmt;

use pocketverse_common::{HotSearchItem, NewsItem, SocialPost, StateEvent, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    News,
    Tickets,
    RecommendedPosts,
    WeiboPosts,
    HotSearches,
    MomentsPosts,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::News => "news",
            Stage::Tickets => "tickets",
            Stage::RecommendedPosts => "recommended_posts",
            Stage::WeiboPosts => "weibo_posts",
            Stage::HotSearches => "hot_searches",
            Stage::MomentsPosts => "moments_posts",
        };
        f.write_str(name)
    }
}

/// Weibo refresh: recommended feed, then roster posts, then hot searches.
pub const WEIBO_STAGES: [Stage; 3] = [Stage::RecommendedPosts, Stage::WeiboPosts, Stage::HotSearches];

/// Full world refresh: news, tickets, the weibo stages, then moments.
pub const FULL_REFRESH_STAGES: [Stage; 6] = [
    Stage::News,
    Stage::Tickets,
    Stage::RecommendedPosts,
    Stage::WeiboPosts,
    Stage::HotSearches,
    Stage::MomentsPosts,
];

/// The entities one stage produced. Empty when the stage fell back.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    News(Vec<NewsItem>),
    Tickets(Vec<Ticket>),
    RecommendedPosts(Vec<SocialPost>),
    WeiboPosts(Vec<SocialPost>),
    HotSearches(Vec<HotSearchItem>),
    MomentsPosts(Vec<SocialPost>),
}

impl StageOutput {
    pub fn stage(&self) -> Stage {
        match self {
            StageOutput::News(_) => Stage::News,
            StageOutput::Tickets(_) => Stage::Tickets,
            StageOutput::RecommendedPosts(_) => Stage::RecommendedPosts,
            StageOutput::WeiboPosts(_) => Stage::WeiboPosts,
            StageOutput::HotSearches(_) => Stage::HotSearches,
            StageOutput::MomentsPosts(_) => Stage::MomentsPosts,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            StageOutput::News(v) => v.len(),
            StageOutput::Tickets(v) => v.len(),
            StageOutput::RecommendedPosts(v)
            | StageOutput::WeiboPosts(v)
            | StageOutput::MomentsPosts(v) => v.len(),
            StageOutput::HotSearches(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The store event that merges this output. `None` for an empty stage,
    /// so a failed hot-search refresh never clears the existing list.
    pub fn into_event(self) -> Option<StateEvent> {
        if self.is_empty() {
            return None;
        }
        Some(match self {
            StageOutput::News(items) => StateEvent::NewsPublished(items),
            StageOutput::Tickets(items) => StateEvent::TicketsListed(items),
            StageOutput::HotSearches(items) => StateEvent::HotSearchesReplaced(items),
            StageOutput::RecommendedPosts(posts)
            | StageOutput::WeiboPosts(posts)
            | StageOutput::MomentsPosts(posts) => StateEvent::PostsPublished(posts),
        })
    }
}

/// Outputs of a pipeline run, in stage order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    pub outputs: Vec<StageOutput>,
    /// The stage hook asked to stop before the last stage.
    pub stopped_early: bool,
}

impl PipelineReport {
    pub fn stages(&self) -> Vec<Stage> {
        self.outputs.iter().map(StageOutput::stage).collect()
    }

    pub fn into_events(self) -> Vec<StateEvent> {
        self.outputs
            .into_iter()
            .filter_map(StageOutput::into_event)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocketverse_common::{Platform, USER_ID};

    #[test]
    fn empty_stage_yields_no_event() {
        assert_eq!(StageOutput::HotSearches(Vec::new()).into_event(), None);
    }

    #[test]
    fn posts_stages_publish_posts() {
        let post = SocialPost::new(USER_ID, "x", Platform::Weibo, 1);
        let event = StageOutput::WeiboPosts(vec![post.clone()]).into_event();
        assert_eq!(event, Some(StateEvent::PostsPublished(vec![post])));
    }

    #[test]
    fn report_events_skip_empty_stages() {
        let report = PipelineReport {
            outputs: vec![
                StageOutput::News(Vec::new()),
                StageOutput::Tickets(Vec::new()),
                StageOutput::MomentsPosts(vec![SocialPost::new(USER_ID, "x", Platform::Moments, 1)]),
            ],
            stopped_early: false,
        };
        assert_eq!(report.stages(), vec![Stage::News, Stage::Tickets, Stage::MomentsPosts]);
        assert_eq!(report.into_events().len(), 1);
    }

    #[test]
    fn full_refresh_embeds_weibo_sequence() {
        assert_eq!(&FULL_REFRESH_STAGES[2..5], &WEIBO_STAGES[..]);
        assert_eq!(FULL_REFRESH_STAGES.first(), Some(&Stage::News));
        assert_eq!(FULL_REFRESH_STAGES.last(), Some(&Stage::MomentsPosts));
    }
}
