use slackqa_config::Config;
use tracing::info;

use super::{init_components, resolve_channel};

/// Input parameters for the Ask command strategy.
#[derive(Debug, Clone)]
pub struct AskInput {
    pub config: Config,
    pub query: String,
    /// Channel ID; falls back to `slack.default_channel`
    pub channel: Option<String>,
    /// Restrict the search to one author
    pub user: Option<String>,
}

/// Answer a single question and print the result.
#[derive(Debug, Clone, Copy)]
pub struct AskStrategy;

impl super::CommandStrategy for AskStrategy {
    type Input = AskInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let components = init_components(&input.config)?;
        let channel = resolve_channel(&input.config, input.channel);

        info!("Searching {channel} for: {}", input.query);
        let answer = components
            .system
            .process_query_from(&input.query, &channel, input.user.as_deref())
            .await;

        println!("{answer}");
        Ok(())
    }
}
