//! Dependency injection container for the noughts application.

use std::{path::Path, sync::Arc};

use super::config::{AgentConfig, AppConfig};
use crate::{
    Error, Result,
    adapters::MsgPackRepository,
    pipeline::{SelfPlayTrainer, TrainingResult},
    ports::SnapshotRepository,
    q_learning::{QLearningAgent, SavedAgent},
};

/// Application with dependency injection.
///
/// # Examples
///
/// ```no_run
/// use noughts::app::{AgentConfig, App, AppConfig};
/// use noughts::pipeline::{SelfPlayTrainer, TrainingConfig};
///
/// let app = App::with_config(AppConfig::default().with_model_path("trained.msgpack"));
/// let trainer = SelfPlayTrainer::new(TrainingConfig::default());
/// let (agent, result) = app.train_and_save(AgentConfig::default(), trainer)?;
/// # Ok::<(), noughts::Error>(())
/// ```
pub struct App {
    /// Repository for agent snapshots
    repository: Arc<dyn SnapshotRepository + Send + Sync>,
    config: AppConfig,
}

impl App {
    /// Create a new app with production defaults: `MsgPackRepository` and
    /// the default [`AppConfig`].
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            repository: Arc::new(MsgPackRepository::new()),
            config,
        }
    }

    /// Create a builder for constructing an app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn repository(&self) -> Arc<dyn SnapshotRepository + Send + Sync> {
        Arc::clone(&self.repository)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Create an untrained agent. A seed in `config` wins over the app default.
    pub fn create_agent(&self, config: AgentConfig) -> Result<QLearningAgent> {
        let mut agent = QLearningAgent::new(config.hyperparameters)?;
        if let Some(seed) = config.seed.or(self.config.default_seed) {
            agent.set_rng_seed(seed);
        }
        Ok(agent)
    }

    /// Load an agent from persistent storage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SnapshotNotFound`] when nothing is stored at `path`,
    /// plus the decoding and validation errors of [`SavedAgent::to_agent`].
    pub fn load_agent(&self, path: &Path) -> Result<QLearningAgent> {
        let mut agent = self.repository.load(path)?.to_agent()?;
        if let Some(seed) = self.config.default_seed {
            agent.set_rng_seed(seed);
        }
        log::info!(
            "Loaded agent from {}: {} states, epsilon {:.4}",
            path.display(),
            agent.table().len(),
            agent.epsilon()
        );
        Ok(agent)
    }

    /// Save an agent, creating parent directories when configured to.
    pub fn save_agent(&self, agent: &QLearningAgent, path: &Path) -> Result<()> {
        if self.config.create_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|source| Error::Io {
                    operation: format!("create directory {}", parent.display()),
                    source,
                })?;
            }
        }
        self.repository.save(&SavedAgent::from_agent(agent), path)?;
        log::info!("Saved agent to {} ({} states)", path.display(), agent.table().len());
        Ok(())
    }

    /// Train a fresh agent with `trainer` and save it to the configured model path.
    pub fn train_and_save(
        &self,
        agent_config: AgentConfig,
        mut trainer: SelfPlayTrainer,
    ) -> Result<(QLearningAgent, TrainingResult)> {
        let mut agent = self.create_agent(agent_config)?;
        let result = trainer.run(&mut agent)?;
        self.save_agent(&agent, &self.config.model_path)?;
        Ok((agent, result))
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing an app with custom dependencies.
///
/// # Examples
///
/// ```
/// use noughts::app::AppBuilder;
/// use noughts::adapters::InMemoryRepository;
///
/// let app = AppBuilder::new()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
#[derive(Default)]
pub struct AppBuilder {
    repository: Option<Arc<dyn SnapshotRepository + Send + Sync>>,
    config: AppConfig,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom snapshot repository.
    pub fn with_repository<R: SnapshotRepository + Send + Sync + 'static>(
        mut self,
        repo: R,
    ) -> Self {
        self.repository = Some(Arc::new(repo));
        self
    }

    /// Set a default random seed for all agents created or loaded by the app.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.config.default_seed = Some(seed);
        self
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the app. Without a repository, `MsgPackRepository` is used.
    pub fn build(self) -> App {
        App {
            repository: self
                .repository
                .unwrap_or_else(|| Arc::new(MsgPackRepository::new())),
            config: self.config,
        }
    }
}
