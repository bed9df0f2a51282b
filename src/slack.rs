use crate::metrics::external::{Target, external_request_timer, record_external_request_failure};
use reqwest::Client;

pub mod message;

pub use message::{ChatBlock, ChatMessage, format_report};

/// Posts messages to a Slack incoming webhook
#[derive(Debug, Clone)]
pub struct Slack {
    client: Client,
    url: String,
}

impl Slack {
    /// Create a new Slack instance
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Post a message once. Failures are logged, never retried or returned.
    #[tracing::instrument(skip_all)]
    pub async fn send(&self, message: &ChatMessage) {
        let _timer = external_request_timer(Target::Notification);

        match self.client.post(&self.url).json(message).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!("Notification delivered");
            }
            Ok(resp) => {
                record_external_request_failure(Target::Notification);
                tracing::warn!("Could not send to Slack: HTTP {}", resp.status());
            }
            Err(e) => {
                record_external_request_failure(Target::Notification);
                tracing::warn!("Could not send to Slack: {}", e);
            }
        }
    }
}
