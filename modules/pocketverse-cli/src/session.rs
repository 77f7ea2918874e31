//! Load state → run one operation → apply events → save.

use std::sync::Arc;

use ai_client::{ModelResolver, ProviderRegistry};
use anyhow::{bail, Context, Result};
use pocketverse_common::file_config::FileConfig;
use pocketverse_common::persist::{load_state, save_state, KeyValueStore};
use pocketverse_common::{now_millis, ApiConfig, AppConfig, AppState, Character, StateEvent};
use pocketverse_world::{FixedDelay, Pacer, StorylinePolicy, WorldEngine, WorldView};
use tracing::{debug, info};

pub struct Session {
    store: Box<dyn KeyValueStore>,
    pub state: AppState,
    /// Effective model settings: the saved config plus env keys and TOML
    /// overrides. Never persisted.
    pub api: ApiConfig,
    pub engine: WorldEngine,
}

impl Session {
    pub fn open(
        store: Box<dyn KeyValueStore>,
        config: &AppConfig,
        file: &FileConfig,
        resolver: Arc<dyn ModelResolver>,
        pacer: Arc<dyn Pacer>,
    ) -> Result<Self> {
        let state = load_state(store.as_ref(), now_millis()).context("Failed to load state")?;

        let mut api = state.api.clone();
        config.seed_vault(&mut api.provider_keys);
        if let Some(model) = &file.models.chat {
            api.chat.model = model.clone();
        }
        if let Some(model) = &file.models.world {
            api.world.model = model.clone();
        }
        info!(chat = %api.chat.model, world = %api.world.model, "Models selected");

        let engine = WorldEngine::new(resolver)
            .with_pacer(pacer)
            .with_storyline_policy(StorylinePolicy::every(file.storyline.every_messages));

        Ok(Self {
            store,
            state,
            api,
            engine,
        })
    }

    pub fn view(&self) -> WorldView<'_> {
        WorldView {
            api: &self.api,
            ..WorldView::from_state(&self.state)
        }
    }

    pub fn apply(&mut self, event: StateEvent) -> Result<()> {
        debug!(?event, "Applying event");
        self.state.apply(&event)?;
        Ok(())
    }

    pub fn apply_all(&mut self, events: impl IntoIterator<Item = StateEvent>) -> Result<()> {
        for event in events {
            self.apply(event)?;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        save_state(self.store.as_ref(), &self.state).context("Failed to save state")
    }

    /// Look a character up by id, exact name, or name prefix.
    pub fn find_character(&self, key: &str) -> Result<&Character> {
        let characters = &self.state.characters;
        if let Some(c) = characters.iter().find(|c| c.id == key || c.name == key) {
            return Ok(c);
        }
        let matches: Vec<&Character> = characters.iter().filter(|c| c.name.starts_with(key)).collect();
        match matches.as_slice() {
            [one] => Ok(one),
            [] => bail!("No character matches '{key}'"),
            _ => bail!("'{key}' matches {} characters, use the id", matches.len()),
        }
    }
}

/// Provider registry with the built-in table plus TOML endpoints.
pub fn build_registry(file: &FileConfig) -> ProviderRegistry {
    file.endpoints
        .iter()
        .fold(ProviderRegistry::new(), |registry, endpoint| {
            registry.with_endpoint(endpoint.into())
        })
}

pub fn build_pacer(file: &FileConfig) -> Arc<dyn Pacer> {
    Arc::new(FixedDelay::from_millis(file.pacing.stage_delay_ms))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use pocketverse_common::persist::MemoryStore;
    use pocketverse_world::testing::{ScriptedModel, StaticResolver};
    use pocketverse_world::NoDelay;

    /// A seeded in-memory session whose every model call goes to `model`.
    pub fn session_with(model: Arc<ScriptedModel>) -> Session {
        let config = AppConfig {
            provider_keys: Default::default(),
            data_dir: ".".into(),
            config_path: None,
        };
        Session::open(
            Box::new(MemoryStore::new()),
            &config,
            &FileConfig::default(),
            Arc::new(StaticResolver::new(model)),
            Arc::new(NoDelay),
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocketverse_common::file_config::parse_config;
    use pocketverse_common::persist::MemoryStore;
    use pocketverse_world::testing::{ScriptedModel, StaticResolver};
    use pocketverse_world::NoDelay;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn config(keys: &[(&str, &str)]) -> AppConfig {
        AppConfig {
            provider_keys: keys
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            data_dir: PathBuf::from("."),
            config_path: None,
        }
    }

    fn open(file: &FileConfig, config: &AppConfig) -> Session {
        Session::open(
            Box::new(MemoryStore::new()),
            config,
            file,
            Arc::new(StaticResolver::new(Arc::new(ScriptedModel::new()))),
            Arc::new(NoDelay),
        )
        .unwrap()
    }

    #[test]
    fn env_keys_and_overrides_stay_out_of_saved_state() {
        let file = parse_config("[models]\nchat = \"deepseek-chat\"\n").unwrap();
        let session = open(&file, &config(&[("deepseek", "sk-env")]));

        assert_eq!(session.api.chat.model, "deepseek-chat");
        assert_eq!(session.api.provider_keys["deepseek"], "sk-env");
        assert_ne!(session.state.api.chat.model, "deepseek-chat");
        assert!(!session.state.api.provider_keys.contains_key("deepseek")
            || session.state.api.provider_keys["deepseek"].is_empty());
    }

    #[test]
    fn find_character_by_prefix() {
        let session = open(&FileConfig::default(), &config(&[]));
        let first = session.state.characters[0].clone();
        let prefix: String = first.name.chars().take(2).collect();
        assert_eq!(session.find_character(&prefix).unwrap().id, first.id);
        assert_eq!(session.find_character(&first.id).unwrap().id, first.id);
        assert!(session.find_character("不存在").is_err());
    }

    #[test]
    fn registry_includes_toml_endpoints() {
        let file = parse_config(
            "[[endpoints]]\nmodel = \"moonshot-v1-8k\"\nurl = \"https://api.moonshot.cn/v1/chat/completions\"\nprovider = \"moonshot\"\n",
        )
        .unwrap();
        let registry = build_registry(&file);
        assert!(registry.endpoint("moonshot-v1-8k").is_some());
        assert!(registry.endpoint("glm-4-flash").is_some());
    }
}
