use {
    teloxide::{
        prelude::*,
        types::{CallbackQuery, ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId},
    },
    tracing::{debug, warn},
};

use crate::{
    config::TelegramBotConfig,
    outbound::RelayOutbound,
    relay::{self, LinkRequest},
    state::RelayState,
    texts,
};

/// Bot commands the relay answers itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command<'a> {
    Start,
    Help,
    /// Any other command, or one addressed to a different bot. Ignored.
    Unknown(&'a str),
}

/// Parse a leading `/command` or `/command@bot_username`.
///
/// Returns `None` for text that is not a command.
fn parse_command<'a>(text: &'a str, bot_username: Option<&str>) -> Option<Command<'a>> {
    let token = text.trim_start().split_whitespace().next()?;
    let command = token.strip_prefix('/')?;
    if command.is_empty() {
        return None;
    }
    let (name, target) = match command.split_once('@') {
        Some((name, target)) => (name, Some(target)),
        None => (command, None),
    };
    if let (Some(target), Some(me)) = (target, bot_username)
        && !target.eq_ignore_ascii_case(me)
    {
        return Some(Command::Unknown(command));
    }
    Some(match name {
        "start" => Command::Start,
        "help" => Command::Help,
        _ => Command::Unknown(name),
    })
}

/// Inline keyboard under the greeting: the help button, plus a link to the
/// developer unless it has been blanked out.
fn welcome_keyboard(config: &TelegramBotConfig) -> InlineKeyboardMarkup {
    let mut rows = vec![vec![InlineKeyboardButton::callback(
        texts::HELP_BUTTON,
        texts::HELP_CALLBACK,
    )]];
    if let Some(raw) = config
        .developer_url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
    {
        match reqwest::Url::parse(raw) {
            Ok(url) => rows.push(vec![InlineKeyboardButton::url(texts::DEVELOPER_BUTTON, url)]),
            Err(e) => warn!(url = raw, error = %e, "ignoring invalid developer_url"),
        }
    }
    InlineKeyboardMarkup::new(rows)
}

async fn send_welcome(
    state: &RelayState,
    chat_id: ChatId,
    reply_to: MessageId,
) -> anyhow::Result<()> {
    state
        .outbound
        .send_text_with_markup(
            chat_id,
            Some(reply_to),
            texts::WELCOME,
            welcome_keyboard(&state.config),
        )
        .await?;
    Ok(())
}

/// Handle a single inbound message.
///
/// Commands are answered directly; any other text goes through the relay
/// workflow. Non-text messages are ignored.
pub async fn handle_message(msg: Message, state: &RelayState) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let Some(text) = msg.text() else {
        debug!(chat_id = chat_id.0, "ignoring non-text message");
        return Ok(());
    };

    if let Some(command) = parse_command(text, state.bot_username.as_deref()) {
        match command {
            Command::Start => send_welcome(state, chat_id, msg.id).await?,
            Command::Help => {
                state
                    .outbound
                    .send_text(chat_id, Some(msg.id), texts::HELP)
                    .await?;
            },
            Command::Unknown(name) => {
                debug!(chat_id = chat_id.0, command = name, "ignoring unknown command");
            },
        }
        return Ok(());
    }

    let request = LinkRequest {
        chat_id,
        message_id: msg.id,
        text: text.to_string(),
    };
    relay::relay_link(state, state.outbound.as_ref(), &request).await?;
    Ok(())
}

/// Handle an inline keyboard button press.
pub async fn handle_callback_query(query: CallbackQuery, state: &RelayState) -> anyhow::Result<()> {
    // Dismiss the loading spinner whatever the button was.
    if let Err(e) = state.bot.answer_callback_query(&query.id).await {
        warn!(error = %e, "failed to answer callback query");
    }

    let Some(data) = query.data.as_deref() else {
        return Ok(());
    };
    if data != texts::HELP_CALLBACK {
        debug!(callback_data = data, "ignoring unknown callback");
        return Ok(());
    }

    let Some(chat_id) = query.message.as_ref().map(|m| m.chat().id) else {
        return Ok(());
    };
    state.outbound.send_text(chat_id, None, texts::HELP).await?;
    Ok(())
}
