pub mod assemble;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod pacing;
pub mod pipeline;
pub mod prompts;
pub mod responses;
pub mod storyline;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;


pub use engine::{WorldEngine, WorldView};
pub use error::{WorldError, WorldResult};
pub use pacing::{FixedDelay, NoDelay, Pacer};
pub use pipeline::{PipelineReport, Stage, StageOutput, FULL_REFRESH_STAGES, WEIBO_STAGES};
pub use prompts::{ChatContext, Prompt};
pub use responses::{ReplySegment, SegmentKind};
pub use storyline::StorylinePolicy;
