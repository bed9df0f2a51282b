use crate::{
    auth::validate_token,
    config::Config,
    error::{Error, Result},
    metrics::{self, Status},
    report::{CommandResult, CommandResultSet, CommandSpec},
};
use std::time::Duration;
use tokio::process::Command;

/// Runs the diagnostic commands configured for an alert
#[derive(Debug, Clone)]
pub struct Executor {
    shell: String,
    timeout: Duration,
}

impl Executor {
    /// Create a new Executor running commands through `bash -c`
    pub fn new(timeout: Duration) -> Self {
        Self {
            shell: "bash".to_string(),
            timeout,
        }
    }

    /// Use a different shell binary
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Validate a report request and run the alert's commands
    #[tracing::instrument(skip(self, config, token))]
    pub async fn run_report(
        &self,
        config: &Config,
        token: Option<&str>,
        alert_name: Option<&str>,
    ) -> Result<CommandResultSet> {
        validate_token(&config.token, token)?;

        let alert_name = alert_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::validation("Missing alert name"))?;

        // Work on a private copy; the config is shared by every request.
        let specs = config.commands_for(alert_name).to_vec();

        tracing::info!("Running {} command(s) for '{}'", specs.len(), alert_name);

        Ok(self.run_all(specs).await)
    }

    /// Run each command in order, one at a time
    pub async fn run_all(&self, specs: Vec<CommandSpec>) -> CommandResultSet {
        let mut commands = Vec::with_capacity(specs.len());

        for spec in specs {
            let output = self.run(&spec.command).await;
            commands.push(CommandResult::new(spec, output));
        }

        CommandResultSet { commands }
    }

    /// Run a single command, returning either its output or a description of the failure
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, command: &str) -> String {
        let _timer = metrics::commands::command_timer();

        let child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .kill_on_drop(true)
            .output();

        let (status, output) = match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) if output.status.success() => (
                Status::Success,
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            ),
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stderr = stderr.trim();

                let message = match stderr.is_empty() {
                    true => output.status.to_string(),
                    false => format!("{}: {}", output.status, stderr),
                };

                (Status::Failure, message)
            }
            Ok(Err(e)) => (Status::Failure, e.to_string()),
            Err(_) => (
                Status::Failure,
                Error::Timeout(self.timeout).to_string(),
            ),
        };

        if let Status::Failure = status {
            tracing::warn!("Command failed: {}", output);
        }

        metrics::commands::record_command_execution(status);

        output
    }
}
