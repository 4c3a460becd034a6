use {
    async_trait::async_trait,
    instarelay_media::{ClassifiedFile, MediaKind},
    teloxide::{
        ApiError, RequestError,
        payloads::{SendMessageSetters, SendPhotoSetters, SendVideoSetters},
        prelude::*,
        types::{ChatAction, ChatId, InputFile, MessageId, ReplyMarkup, ReplyParameters},
    },
    tracing::{debug, info},
};

use crate::error::Result;

/// Outbound operations the relay workflow needs from the chat platform.
#[async_trait]
pub trait RelayOutbound: Send + Sync {
    /// Send a text message, optionally as a reply, and return its id.
    async fn send_text(
        &self,
        chat_id: ChatId,
        reply_to: Option<MessageId>,
        text: &str,
    ) -> Result<MessageId>;

    /// Replace the text of a message sent earlier.
    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> Result<()>;

    /// Upload a downloaded file as a video or photo reply.
    async fn send_media(
        &self,
        chat_id: ChatId,
        reply_to: MessageId,
        file: &ClassifiedFile,
        caption: &str,
    ) -> Result<()>;
}

/// Outbound message sender backed by the Bot API.
pub struct TelegramOutbound {
    bot: Bot,
}

impl TelegramOutbound {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Send a text message with an attached keyboard.
    pub async fn send_text_with_markup(
        &self,
        chat_id: ChatId,
        reply_to: Option<MessageId>,
        text: &str,
        markup: impl Into<ReplyMarkup> + Send,
    ) -> Result<MessageId> {
        let mut req = self.bot.send_message(chat_id, text).reply_markup(markup);
        if let Some(id) = reply_to {
            req = req.reply_parameters(reply_params(id));
        }
        let message = req.await?;
        Ok(message.id)
    }
}

/// Reply to `id`, but still deliver if the user deleted their message.
fn reply_params(id: MessageId) -> ReplyParameters {
    ReplyParameters::new(id).allow_sending_without_reply()
}

fn is_message_not_modified_error(error: &RequestError) -> bool {
    matches!(error, RequestError::Api(ApiError::MessageNotModified))
}

#[async_trait]
impl RelayOutbound for TelegramOutbound {
    async fn send_text(
        &self,
        chat_id: ChatId,
        reply_to: Option<MessageId>,
        text: &str,
    ) -> Result<MessageId> {
        let mut req = self.bot.send_message(chat_id, text);
        if let Some(id) = reply_to {
            req = req.reply_parameters(reply_params(id));
        }
        let message = req.await?;
        debug!(
            chat_id = chat_id.0,
            message_id = message.id.0,
            text_len = text.len(),
            "telegram text sent"
        );
        Ok(message.id)
    }

    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> Result<()> {
        match self.bot.edit_message_text(chat_id, message_id, text).await {
            Ok(_) => Ok(()),
            Err(e) if is_message_not_modified_error(&e) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn send_media(
        &self,
        chat_id: ChatId,
        reply_to: MessageId,
        file: &ClassifiedFile,
        caption: &str,
    ) -> Result<()> {
        let input = InputFile::file(file.path.clone());
        match file.kind {
            MediaKind::Video => {
                let _ = self
                    .bot
                    .send_chat_action(chat_id, ChatAction::UploadVideo)
                    .await;
                self.bot
                    .send_video(chat_id, input)
                    .caption(caption)
                    .reply_parameters(reply_params(reply_to))
                    .await?;
            },
            MediaKind::Image => {
                let _ = self
                    .bot
                    .send_chat_action(chat_id, ChatAction::UploadPhoto)
                    .await;
                self.bot
                    .send_photo(chat_id, input)
                    .caption(caption)
                    .reply_parameters(reply_params(reply_to))
                    .await?;
            },
        }
        info!(
            chat_id = chat_id.0,
            kind = file.kind.as_str(),
            file = %file.path.display(),
            "telegram outbound media sent"
        );
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_params_target_message() {
        let params = reply_params(MessageId(7));
        assert_eq!(params.message_id, MessageId(7));
    }

    #[test]
    fn message_not_modified_is_recognised() {
        assert!(is_message_not_modified_error(&RequestError::Api(
            ApiError::MessageNotModified
        )));
        assert!(!is_message_not_modified_error(&RequestError::Api(
            ApiError::BotBlocked
        )));
    }
}
