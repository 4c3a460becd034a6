//! Telegram front end of the relay.
//!
//! Receives updates via manual long polling with teloxide, answers `/start`,
//! `/help` and the inline help button, and runs the link relay workflow for
//! every other text message.

pub mod bot;
pub mod config;
pub mod error;
pub mod handlers;
pub mod outbound;
pub mod relay;
pub mod state;
pub mod texts;

pub use {
    bot::{PollingHandle, start_polling},
    config::TelegramBotConfig,
    error::{Error, Result},
    relay::{FailureReason, LinkRequest, RelayOutcome, relay_link},
    state::RelayState,
};
