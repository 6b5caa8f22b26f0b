use crate::cli::commands::{Cli, Commands};
use anyhow::Result;
use calmline::Config;
use calmline::emotion::{self, classify_or_neutral};
use calmline::gateway;
use calmline::safety::CrisisFilter;

/// Print the crisis verdict and emotion label the relay would use.
async fn run_classify(config: &Config, message: &str) -> Result<()> {
    let crisis = CrisisFilter::from_config(&config.safety);
    if let Some(keyword) = crisis.matched_keyword(message) {
        println!("crisis: yes (matched \"{keyword}\")");
        println!("reply:  {}", crisis.safe_reply());
        return Ok(());
    }

    let classifier = emotion::create_classifier(&config.classifier);
    let label = classify_or_neutral(classifier.as_ref(), message).await;
    println!("crisis:  no");
    println!("emotion: {label} ({})", classifier.name());
    Ok(())
}

pub async fn dispatch(cli: Cli, mut config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.gateway.port = port;
            }
            if let Some(host) = host {
                config.gateway.host = host;
            }
            gateway::run_gateway(config).await
        }
        Commands::Classify { message } => run_classify(&config, &message).await,
    }
}
