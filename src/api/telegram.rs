use teloxide::requests::Requester;
use teloxide::types::{ChatId, Recipient};
use teloxide::Bot;

use crate::{Error, Result};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Outbound-only Telegram notifier over `teloxide`
#[derive(Clone)]
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(token: String) -> Result<Self> {
        Self::with_base_url(token, TELEGRAM_API_BASE)
    }

    /// Create a client against a custom Bot API endpoint
    pub fn with_base_url(token: String, base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let api_url = reqwest::Url::parse(&base_url)
            .map_err(|e| Error::Config(format!("invalid telegram_base_url {}: {}", base_url, e)))?;

        Ok(Self {
            bot: Bot::new(token).set_api_url(api_url),
        })
    }

    /// Post a plain-text message to a chat
    ///
    /// `chat_id` is a numeric chat id or an `@channel` username.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        self.bot
            .send_message(recipient(chat_id), text)
            .await
            .map_err(|e| Error::Notification(e.to_string().replace(self.bot.token(), "<token>")))?;

        Ok(())
    }
}

fn recipient(chat_id: &str) -> Recipient {
    match chat_id.trim().parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(chat_id.trim().to_string()),
    }
}
