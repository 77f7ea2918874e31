pub mod error;
pub mod gemini;
pub mod openai;
pub mod registry;
pub mod schema;
pub mod traits;
pub mod util;

pub use error::AiError;
pub use gemini::Gemini;
pub use openai::OpenAiCompatible;
pub use registry::{EndpointEntry, ProviderRegistry};
pub use schema::StructuredOutput;
pub use traits::{ChatModel, CompletionRequest, Credentials, ModelResolver, CREATIVE_TEMPERATURE};
pub use util::{extract_json, redact, strip_code_blocks, truncate_to_char_boundary};
