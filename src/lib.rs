#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod config;
pub mod conversation;
pub mod emotion;
pub mod error;
pub mod gateway;
pub mod prompt;
pub mod providers;
pub mod relay;
pub mod safety;

pub use config::Config;
pub use relay::{ChatRelay, RelayReply};
