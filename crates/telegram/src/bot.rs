use std::{path::PathBuf, sync::Arc, time::Duration};

use {
    instarelay_instagram::MediaFetcher,
    secrecy::ExposeSecret,
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{AllowedUpdate, BotCommand, UpdateKind},
    },
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use crate::{config::TelegramBotConfig, handlers, state::RelayState};

/// Extra time the HTTP client waits beyond the long-poll timeout.
const CLIENT_TIMEOUT_MARGIN_SECS: u64 = 15;

/// Pause before retrying after a failed `getUpdates`.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// A running polling loop.
pub struct PollingHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    bot_username: Option<String>,
}

impl PollingHandle {
    /// Username reported by `getMe`.
    #[must_use]
    pub fn bot_username(&self) -> Option<&str> {
        self.bot_username.as_deref()
    }

    /// Token cancelled when the loop stops, either on request or because
    /// another instance took over the bot.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop polling and wait for the loop to exit.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.cancel.cancel();
        self.task.await?;
        Ok(())
    }
}

/// Connect to the Bot API and start the polling loop.
///
/// Verifies the token with `getMe`, clears any webhook and registers the
/// command list before spawning the loop. Every update is handled on its own
/// task so a slow download never holds up other chats.
pub async fn start_polling(
    config: TelegramBotConfig,
    fetcher: Arc<dyn MediaFetcher>,
    work_root: PathBuf,
) -> anyhow::Result<PollingHandle> {
    let poll_timeout = config.poll_timeout_secs;
    let client = teloxide::net::default_reqwest_settings()
        .timeout(Duration::from_secs(
            u64::from(poll_timeout) + CLIENT_TIMEOUT_MARGIN_SECS,
        ))
        .build()?;
    let mut bot = Bot::with_client(config.token.expose_secret(), client);
    if let Some(raw) = config.api_url.as_deref() {
        bot = bot.set_api_url(reqwest::Url::parse(raw)?);
    }

    let me = bot.get_me().await?;
    let bot_username = me.username.clone();

    bot.delete_webhook().send().await?;

    let commands = vec![
        BotCommand::new("start", "Welcome message"),
        BotCommand::new("help", "How to use the bot"),
    ];
    if let Err(e) = bot.set_my_commands(commands).await {
        warn!("failed to register bot commands: {e}");
    }

    info!(
        username = ?bot_username,
        work_root = %work_root.display(),
        "telegram bot connected (webhook cleared)"
    );

    let state = Arc::new(RelayState::new(
        bot.clone(),
        bot_username.clone(),
        config,
        fetcher,
        work_root,
    ));
    let cancel = CancellationToken::new();
    let task = tokio::spawn(poll_loop(bot, state, cancel.clone(), poll_timeout));

    Ok(PollingHandle {
        cancel,
        task,
        bot_username,
    })
}

async fn poll_loop(bot: Bot, state: Arc<RelayState>, cancel: CancellationToken, timeout: u32) {
    info!("starting telegram polling loop");
    let mut offset: i32 = 0;

    loop {
        let request = bot
            .get_updates()
            .offset(offset)
            .timeout(timeout)
            .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::CallbackQuery])
            .send();

        let result = tokio::select! {
            () = cancel.cancelled() => break,
            result = request => result,
        };

        match result {
            Ok(updates) => {
                debug!(count = updates.len(), "got telegram updates");
                for update in updates {
                    offset = update.id.as_offset();
                    dispatch(update.kind, &state);
                }
            },
            Err(RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) => {
                warn!("telegram polling stopped: another instance is already running with this token");
                cancel.cancel();
                break;
            },
            Err(e) => {
                warn!(error = %e, "telegram getUpdates failed");
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(POLL_RETRY_DELAY) => {},
                }
            },
        }
    }

    info!("telegram polling stopped");
}

fn dispatch(kind: UpdateKind, state: &Arc<RelayState>) {
    match kind {
        UpdateKind::Message(msg) => {
            debug!(chat_id = msg.chat.id.0, "received telegram message");
            let state = Arc::clone(state);
            tokio::spawn(async move {
                if let Err(e) = handlers::handle_message(msg, &state).await {
                    error!(error = %e, "error handling telegram message");
                }
            });
        },
        UpdateKind::CallbackQuery(query) => {
            debug!(callback_data = ?query.data, "received telegram callback query");
            let state = Arc::clone(state);
            tokio::spawn(async move {
                if let Err(e) = handlers::handle_callback_query(query, &state).await {
                    error!(error = %e, "error handling telegram callback query");
                }
            });
        },
        other => debug!("ignoring update: {other:?}"),
    }
}
