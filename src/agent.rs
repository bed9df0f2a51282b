use crate::{
    error::{Error, Result},
    metrics::external::{Target, external_request_timer, record_external_request_failure},
    report::CommandResultSet,
};
use reqwest::Client;

/// Calls the `/report` endpoint of the agent running on an alerting host
#[derive(Debug, Clone)]
pub struct Agent {
    client: Client,
    token: String,
    port: u16,
}

impl Agent {
    /// Create a new Agent client
    pub fn new(client: Client, token: impl Into<String>, port: u16) -> Self {
        Self {
            client,
            token: token.into(),
            port,
        }
    }

    /// Ask the agent on `host` to run the commands configured for `alert_name`
    #[tracing::instrument(skip(self))]
    pub async fn fetch_report(&self, host: &str, alert_name: &str) -> Result<CommandResultSet> {
        let result = self.request(host, alert_name).await;

        if result.is_err() {
            record_external_request_failure(Target::Agent);
        }

        result
    }

    async fn request(&self, host: &str, alert_name: &str) -> Result<CommandResultSet> {
        let _timer = external_request_timer(Target::Agent);

        let url = format!("http://{}:{}/report", host, self.port);

        tracing::debug!("Requesting report from {}", url);

        let resp = self
            .client
            .get(&url)
            .query(&[("token", self.token.as_str()), ("alertName", alert_name)])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Network(format!(
                "Agent at {} answered HTTP {}",
                host,
                resp.status()
            )));
        }

        let body = resp.text().await?;

        serde_json::from_str(&body).map_err(|e| Error::ResponseParse(e.to_string()))
    }
}
