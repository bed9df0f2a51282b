use crate::{
    agent::Agent,
    alert::{Alert, AlertBatch},
    config::{Config, Settings},
    error::Error,
    hosts::resolve_host,
    metrics::dispatch::{record_alert_received, record_dispatch_completed, record_dispatch_unit},
    slack::{Slack, format_report},
};
use reqwest::Client;
use std::{sync::Arc, time::Duration};
use tokio::{sync::Semaphore, task::JoinSet, time::Instant};

/// Build the ceiling shared by every dispatch, if one is configured
pub fn concurrency_limit(settings: &Settings) -> Option<Arc<Semaphore>> {
    settings
        .max_concurrency
        .map(|limit| Arc::new(Semaphore::new(limit)))
}

/// What happened to a single firing alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The agent answered and a notification was attempted
    Reported,
    /// No host could be worked out from the alert
    Skipped,
    /// The agent could not be reached, failed, or answered garbage
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Reported => "reported",
            Outcome::Skipped => "skipped",
            Outcome::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub firing: usize,
    pub reported: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl DispatchSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Reported => self.reported += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.failed += 1,
        }
    }
}

/// Fans a batch of alerts out to the agents and relays their reports
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: Arc<Config>,
    agent: Agent,
    slack: Slack,
    unit_timeout: Duration,
    limit: Option<Arc<Semaphore>>,
}

impl Dispatcher {
    /// Create a new Dispatcher for one config snapshot, without a concurrency ceiling
    pub fn new(config: Arc<Config>, client: Client, settings: &Settings) -> Self {
        let agent = Agent::new(client.clone(), config.token.clone(), settings.agent_port);
        let slack = Slack::new(client, config.slack.clone());

        Self {
            config,
            agent,
            slack,
            unit_timeout: settings.unit_timeout,
            limit: None,
        }
    }

    /// Share a process-wide ceiling on the number of alerts handled at once
    pub fn with_limit(mut self, limit: Option<Arc<Semaphore>>) -> Self {
        self.limit = limit;
        self
    }

    /// Process every firing alert of a batch concurrently and wait for all of them.
    ///
    /// Failures stay inside their own alert. Dropping the returned future aborts
    /// whatever is still running.
    #[tracing::instrument(skip_all, fields(alerts = batch.alerts.len()))]
    pub async fn dispatch(&self, batch: AlertBatch) -> DispatchSummary {
        let mut units = JoinSet::new();

        for alert in batch.alerts {
            record_alert_received(&alert.status);

            if !alert.is_firing() {
                continue;
            }

            let dispatcher = self.clone();
            units.spawn(async move { dispatcher.process(alert).await });
        }

        let mut summary = DispatchSummary {
            firing: units.len(),
            ..Default::default()
        };

        while let Some(joined) = units.join_next().await {
            let outcome = joined.unwrap_or_else(|e| {
                tracing::error!("Alert task did not finish: {}", e);
                Outcome::Failed
            });

            record_dispatch_unit(outcome.as_str());
            summary.record(outcome);
        }

        record_dispatch_completed();

        tracing::info!(
            firing = summary.firing,
            reported = summary.reported,
            skipped = summary.skipped,
            failed = summary.failed,
            "Batch dispatched"
        );

        summary
    }

    /// Handle one firing alert
    #[tracing::instrument(skip_all, fields(alert = %alert.name(), instance = %alert.labels.instance))]
    async fn process(&self, alert: Alert) -> Outcome {
        let _permit = match &self.limit {
            Some(limit) => limit.clone().acquire_owned().await.ok(),
            None => None,
        };

        let Some(host) = resolve_host(&self.config.hosts, &alert.labels.instance) else {
            tracing::info!("Irrelevant alert, no host to ask");
            return Outcome::Skipped;
        };

        // One deadline covers both the agent call and the notification
        let deadline = Instant::now() + self.unit_timeout;

        let fetch = self.agent.fetch_report(&host, alert.name());

        let report = match tokio::time::timeout_at(deadline, fetch).await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => return failed(&host, e),
            Err(_) => return failed(&host, Error::Timeout(self.unit_timeout)),
        };

        let message = format_report(&alert, &report);

        if tokio::time::timeout_at(deadline, self.slack.send(&message))
            .await
            .is_err()
        {
            tracing::warn!("Could not send to Slack: {}", Error::Timeout(self.unit_timeout));
        }

        Outcome::Reported
    }
}

fn failed(host: &str, error: Error) -> Outcome {
    tracing::warn!(kind = error.kind(), "Could not get report from {}: {}", host, error);
    Outcome::Failed
}
