use clap::Parser;
use std::{net::IpAddr, path::PathBuf, sync::Arc};
use tokio::{
    select,
    signal::unix::{SignalKind, signal},
};

pub mod agent;
pub mod alert;
pub mod auth;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod hosts;
pub mod http;
pub mod metrics;
pub mod report;
pub mod slack;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Address to listen on, IPv4 or IPv6
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value = "5050")]
    pub port: u16,

    /// Port the diagnostic agents listen on
    #[arg(long, default_value = "5050")]
    pub agent_port: u16,

    /// Timeout in seconds for a single outbound HTTP request
    #[arg(long, default_value = "30")]
    pub request_timeout: u64,

    /// Deadline in seconds for one firing alert, counted from when it gets a
    /// concurrency slot and covering both the agent call and the Slack post
    #[arg(long, default_value = "60")]
    pub unit_timeout: u64,

    /// Timeout in seconds for a single diagnostic command
    #[arg(long, default_value = "30")]
    pub command_timeout: u64,

    /// Maximum number of alerts processed at once (unbounded if unset)
    #[arg(long)]
    pub max_concurrency: Option<usize>,
}

/// Handle signals
///
/// SIGTERM and SIGINT exit the process, SIGHUP reloads the config file.
pub fn signal_handler(config: Arc<config::ConfigStore>) -> anyhow::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::spawn(async move {
        loop {
            select! {
                _ = sigterm.recv() => {
                    tracing::info!("SIGTERM received, exiting");
                    std::process::exit(0);
                }
                _ = sigint.recv() => {
                    tracing::info!("SIGINT received, exiting");
                    std::process::exit(0);
                }
                _ = sighup.recv() => {
                    tracing::info!("SIGHUP received, reloading config");

                    if let Err(e) = config.reload().await {
                        tracing::error!("Config reload failed, keeping previous config: {}", e);
                    }
                }
            }
        }
    });

    Ok(())
}
