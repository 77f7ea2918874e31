use clap::ValueEnum;
use pocketverse_common::{Platform, TicketCategory};
use pocketverse_world::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    Moments,
    Weibo,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Moments => Platform::Moments,
            PlatformArg::Weibo => Platform::Weibo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StageArg {
    News,
    Tickets,
    Recommended,
    Weibo,
    Hot,
    Moments,
}

impl StageArg {
    pub fn stage(self) -> Stage {
        match self {
            StageArg::News => Stage::News,
            StageArg::Tickets => Stage::Tickets,
            StageArg::Recommended => Stage::RecommendedPosts,
            StageArg::Weibo => Stage::WeiboPosts,
            StageArg::Hot => Stage::HotSearches,
            StageArg::Moments => Stage::MomentsPosts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShowArg {
    Characters,
    World,
    News,
    Hot,
    Tickets,
    Moments,
    Weibo,
    Chats,
    Wallet,
}

pub fn parse_category(s: &str) -> Result<TicketCategory, String> {
    TicketCategory::parse(s).ok_or_else(|| {
        let valid: Vec<&str> = TicketCategory::ALL.iter().map(|c| c.as_str()).collect();
        format!("unknown category '{s}', expected one of: {}", valid.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parser_lists_valid_values() {
        assert_eq!(parse_category("sports"), Ok(TicketCategory::Sports));
        let err = parse_category("opera").unwrap_err();
        assert!(err.contains("concert, movie, theater, sports, exhibition"));
    }

    #[test]
    fn stage_args_cover_the_full_refresh() {
        let stages: Vec<Stage> = StageArg::value_variants().iter().map(|a| a.stage()).collect();
        assert_eq!(stages, pocketverse_world::FULL_REFRESH_STAGES.to_vec());
    }
}
