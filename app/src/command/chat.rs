//! Interactive question loop over one channel.

use std::io::Write;

use slackqa_config::Config;
use tracing::info;

use super::{init_components, resolve_channel};

const HELP_TEXT: &str = "\
Commands:
  help         show this message
  clear        forget cached answers
  exit, quit   leave
Anything else is searched as a question.";

#[derive(Debug, Clone)]
pub struct ChatInput {
    pub config: Config,
    pub channel: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let components = init_components(&input.config)?;
        let channel = resolve_channel(&input.config, input.channel);

        println!("slackqa chat on {channel}. Type 'help' for commands, 'exit' to quit.\n");

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let mut line = String::new();
            if std::io::stdin().read_line(&mut line)? == 0 {
                break;
            }

            match line.trim() {
                "" => {}
                "exit" | "quit" => break,
                "help" => println!("{HELP_TEXT}\n"),
                "clear" => {
                    components.system.cache().clear().await;
                    println!("Answer cache cleared.\n");
                }
                query => {
                    let answer = components.system.process_query(query, &channel).await;
                    println!("\n{answer}\n");
                }
            }
        }

        info!(
            "Chat ended with {} cached answer(s)",
            components.system.cache().len().await
        );
        Ok(())
    }
}
