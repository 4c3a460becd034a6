use std::{path::PathBuf, sync::Arc};

use instarelay_instagram::MediaFetcher;

use crate::{config::TelegramBotConfig, outbound::TelegramOutbound};

/// Runtime state shared by every update handler.
///
/// Built once when polling starts and never mutated afterwards, so handlers
/// running concurrently only need an `Arc`.
pub struct RelayState {
    pub bot: teloxide::Bot,
    pub bot_username: Option<String>,
    pub config: TelegramBotConfig,
    pub fetcher: Arc<dyn MediaFetcher>,
    /// Directory under which per-request scratch directories are created.
    pub work_root: PathBuf,
    pub outbound: Arc<TelegramOutbound>,
}

impl RelayState {
    #[must_use]
    pub fn new(
        bot: teloxide::Bot,
        bot_username: Option<String>,
        config: TelegramBotConfig,
        fetcher: Arc<dyn MediaFetcher>,
        work_root: PathBuf,
    ) -> Self {
        let outbound = Arc::new(TelegramOutbound::new(bot.clone()));
        Self {
            bot,
            bot_username,
            config,
            fetcher,
            work_root,
            outbound,
        }
    }
}
