use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `Calmline` - emotion-aware, crisis-screened chat relay.
#[derive(Parser, Debug)]
#[command(name = "calmline")]
#[command(version)]
#[command(about = "A supportive chat relay in front of a chat-completion API.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.calmline/config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway (GET /, POST /chat)
    Serve {
        /// Port to listen on (overrides config; 0 picks a free port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Show the crisis verdict and emotion label for one message
    Classify {
        /// Message text to screen
        message: String,
    },
}
