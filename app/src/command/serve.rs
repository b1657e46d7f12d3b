use std::time::Duration;

use slackqa_config::Config;
use slackqa_slack::{AppState, MentionHandler, run_server};
use tracing::{info, warn};

use super::init_components;

pub struct ServeInput {
    pub config: Config,
    /// Overrides `server.port`
    pub port: Option<u16>,
}

/// Run the Slack Events API endpoint until interrupted.
pub struct ServeStrategy;

impl super::CommandStrategy for ServeStrategy {
    type Input = ServeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let ServeInput { config, port } = input;
        let components = init_components(&config)?;

        let mut server = config.server.clone();
        if let Some(port) = port {
            server.port = port;
        }

        if config.slack.signing_secret.is_empty() {
            warn!("SLACK_SIGNING_SECRET is not set; request signatures will not be verified");
        }

        let handler = MentionHandler::new(components.system, components.slack)
            .with_chunking(server.chunk_size, Duration::from_millis(server.chunk_delay_ms));
        let state = AppState::new(handler, &config.slack.signing_secret);

        info!("Starting Slack bot. Press Ctrl+C to stop.");
        run_server(&server, state).await
    }
}
