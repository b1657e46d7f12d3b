//! Static strategy pattern for CLI commands.
//!
//! Each subcommand is its own strategy type with its own input, dispatched
//! statically from `main`.

use std::sync::Arc;

use slackqa_config::{Config, ProviderKind};
use slackqa_core::LLMProvider;
use slackqa_providers::{GeminiProvider, OpenAiCompatibleProvider};
use slackqa_search::{PipelineConfig, SearchSystem};
use slackqa_slack::SlackClient;
use tracing::info;

mod ask;
mod chat;
mod info;
mod init;
mod serve;
mod version;

pub use ask::{AskInput, AskStrategy};
pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use serve::{ServeInput, ServeStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// Each strategy declares its own input type, so `main` passes exactly
/// what a command needs without boxing or casting.
pub trait CommandStrategy: Send + Sync + 'static {
    type Input;

    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Everything a command needs to answer questions.
struct Components {
    system: Arc<SearchSystem>,
    slack: Arc<SlackClient>,
}

fn build_provider(config: &Config) -> Arc<dyn LLMProvider> {
    let settings = &config.provider;
    match settings.kind {
        ProviderKind::Gemini => {
            let mut provider = GeminiProvider::new(settings.api_key.clone());
            if let Some(base_url) = &settings.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            if let Some(model) = &settings.model {
                provider = provider.with_default_model(model.clone());
            }
            Arc::new(provider)
        }
        ProviderKind::OpenAi => {
            let mut provider = OpenAiCompatibleProvider::new(settings.api_key.clone());
            if let Some(base_url) = &settings.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            if let Some(model) = &settings.model {
                provider = provider.with_default_model(model.clone());
            }
            Arc::new(provider)
        }
    }
}

fn pipeline_config(config: &Config) -> PipelineConfig {
    PipelineConfig {
        retrieval: config.search.retrieval.clone(),
        retry: config.search.retry.clone(),
        keywords: config.search.keywords.clone(),
        answer: config.answer.clone(),
    }
}

/// Validate credentials and wire the model, Slack client and pipeline.
fn init_components(config: &Config) -> anyhow::Result<Components> {
    config.validate()?;

    let provider = build_provider(config);
    let model = provider.default_model().to_string();
    info!("Using {:?} model {model}", config.provider.kind);

    let slack = Arc::new(SlackClient::new(
        config.slack.user_token.clone(),
        config.slack.bot_token.clone(),
    )?);
    let system = SearchSystem::new(provider, &model, slack.clone(), pipeline_config(config));

    Ok(Components {
        system: Arc::new(system),
        slack,
    })
}

fn resolve_channel(config: &Config, channel: Option<String>) -> String {
    channel.unwrap_or_else(|| config.slack.default_channel.clone())
}
