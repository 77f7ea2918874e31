// Test mocks for the world engine.
//
// Three mocks matching the three trait boundaries:
// - ScriptedModel (ChatModel): FIFO queue of canned responses, records requests
// - StaticResolver (ModelResolver): hands out one model or a config error
// - RecordingPacer (Pacer): records pauses instead of sleeping
//
// Plus helpers for building characters and world state.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use ai_client::{AiError, ChatModel, CompletionRequest, Credentials, ModelResolver};
use async_trait::async_trait;
use pocketverse_common::{seed, ApiConfig, ApiSettings, Character, UserProfile, WorldState};

use crate::engine::WorldEngine;
use crate::pipeline::Stage;
use crate::pacing::Pacer;

// ---------------------------------------------------------------------------
// ScriptedModel
// ---------------------------------------------------------------------------

enum Scripted {
    Reply(String),
    Fail(String),
}

/// Replies with queued responses in order. An exhausted queue fails like a
/// provider returning nothing. Builder pattern: `.reply()`, `.fail()`.
pub struct ScriptedModel {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, raw: impl Into<String>) -> Self {
        self.script.lock().unwrap().push_back(Scripted::Reply(raw.into()));
        self
    }

    /// Queue a transport failure (non-2xx status).
    pub fn fail(self, body: impl Into<String>) -> Self {
        self.script.lock().unwrap().push_back(Scripted::Fail(body.into()));
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn provider(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Reply(raw)) => Ok(raw),
            Some(Scripted::Fail(body)) => Err(AiError::Api { status: 503, body }),
            None => Err(AiError::EmptyResponse("ScriptedModel: script exhausted".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// StaticResolver
// ---------------------------------------------------------------------------

/// Resolves every model id to the same model, or refuses every id with a
/// missing-credential error.
pub struct StaticResolver {
    model: Option<Arc<dyn ChatModel>>,
    resolved: Mutex<Vec<String>>,
}

impl StaticResolver {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model: Some(model),
            resolved: Mutex::new(Vec::new()),
        }
    }

    pub fn missing_credentials() -> Self {
        Self {
            model: None,
            resolved: Mutex::new(Vec::new()),
        }
    }

    /// Model ids passed to `resolve`, in order.
    pub fn resolved(&self) -> Vec<String> {
        self.resolved.lock().unwrap().clone()
    }
}

impl ModelResolver for StaticResolver {
    fn resolve(
        &self,
        model: &str,
        _credentials: Credentials<'_>,
    ) -> Result<Arc<dyn ChatModel>, AiError> {
        self.resolved.lock().unwrap().push(model.to_string());
        self.model.clone().ok_or_else(|| AiError::MissingCredential {
            model: model.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// RecordingPacer
// ---------------------------------------------------------------------------

/// Records the stage each pause preceded. Never sleeps.
#[derive(Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<Stage>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> Vec<Stage> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, next: Stage) {
        self.pauses.lock().unwrap().push(next);
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Engine wired to `model`, pausing through `pacer`.
pub fn engine_with(model: Arc<ScriptedModel>, pacer: Arc<RecordingPacer>) -> WorldEngine {
    WorldEngine::new(Arc::new(StaticResolver::new(model))).with_pacer(pacer)
}

/// Character with every perception flag on and medium frequencies.
pub fn character(id: &str, name: &str) -> Character {
    Character::new(id, name)
}

pub fn world(description: &str) -> WorldState {
    let mut world = seed::initial_world(1_000);
    world.world_description = description.to_string();
    world
}

pub fn user(name: &str, persona: &str) -> UserProfile {
    UserProfile {
        name: name.to_string(),
        wechat_id: String::new(),
        avatar: String::new(),
        persona: persona.to_string(),
    }
}

/// Distinct chat and world models so tests can tell the purposes apart.
pub fn api_config() -> ApiConfig {
    ApiConfig {
        chat: ApiSettings::new("test-chat-model"),
        world: ApiSettings::new("test-world-model"),
        provider_keys: Default::default(),
    }
}
