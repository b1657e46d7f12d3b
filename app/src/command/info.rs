use slackqa_config::{Config, mask_secret};

/// Print the effective configuration with secrets masked.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = Config;

    async fn execute(&self, config: Self::Input) -> anyhow::Result<()> {
        println!("=== slackqa Configuration ===\n");
        println!("Config file: {}\n", Config::config_path()?.display());

        println!("Slack:");
        println!("  Bot Token: {}", mask_secret(&config.slack.bot_token));
        println!("  User Token: {}", mask_secret(&config.slack.user_token));
        println!("  Signing Secret: {}", mask_secret(&config.slack.signing_secret));
        println!("  Default Channel: {}", config.slack.default_channel);
        println!();

        println!("Model:");
        println!("  Provider: {:?}", config.provider.kind);
        println!("  API Key: {}", mask_secret(&config.provider.api_key));
        println!(
            "  Model: {}",
            config.provider.model.as_deref().unwrap_or("(provider default)")
        );
        if let Some(base_url) = &config.provider.base_url {
            println!("  Base URL: {base_url}");
        }
        println!();

        let retrieval = &config.search.retrieval;
        println!("Search:");
        println!("  Strategy: {:?}", retrieval.strategy);
        println!("  History Limit: {}", retrieval.history_limit);
        println!("  Max Search Results: {}", retrieval.max_search_results);
        println!("  Min Relevance Score: {}", retrieval.min_relevance_score);
        println!("  Retry:");
        println!("    Max Retries: {}", config.search.retry.max_retries);
        println!("    Min Results: {}", config.search.retry.min_results);
        println!("    Thresholds: {:?}", config.search.retry.thresholds);
        println!("  Keywords:");
        println!("    Model Attempts: {}", config.search.keywords.model_attempts);
        println!("    Min Terms: {}", config.search.keywords.min_terms);
        println!();

        println!("Answer:");
        println!("  Max Retries: {}", config.answer.max_retries);
        println!("  Accept Confidence: {}", config.answer.accept_confidence);
        println!();

        println!("Server:");
        println!("  Bind: {}", config.server.bind_addr());
        println!("  Chunk Size: {}", config.server.chunk_size);
        println!("  Chunk Delay: {}ms", config.server.chunk_delay_ms);
        println!();

        println!("Debug: {}", config.debug);

        match config.validate() {
            Ok(()) => println!("\nStatus: ready"),
            Err(e) => println!("\nStatus: {e}"),
        }
        Ok(())
    }
}
