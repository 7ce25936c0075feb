// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tether: hold one container alive, then stop it under a deadline.

mod env;
mod exit_error;
mod output;

use anyhow::Result;
use clap::Parser;
use exit_error::{ExitError, EXIT_FAILED};
use output::Report;
use std::path::PathBuf;
use std::time::Duration;
use tether_adapters::{DockerCliClient, RuntimeClient};
use tether_core::{ImageRef, MatchPolicy};
use tether_engine::{grace_period, CancellationToken, LifecycleConfig, Orchestrator};
use tokio::sync::oneshot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "tether",
    version,
    about = "Run a container until told to stop, then stop it with a kill deadline"
)]
struct Args {
    /// Image to run, e.g. `alpine` or `registry:5000/team/app:1.2`
    #[arg(long)]
    image: ImageRef,

    /// Seconds to wait for a graceful exit before killing. Zero or negative
    /// kills immediately. [env: TETHER_GRACE_SECS, default 10]
    #[arg(long, allow_negative_numbers = true)]
    grace_secs: Option<i64>,

    /// Terminate automatically after this many seconds instead of waiting
    /// for Ctrl-C
    #[arg(long)]
    run_for_secs: Option<u64>,

    /// Only accept a local image whose tag matches exactly
    #[arg(long)]
    exact_tag: bool,

    /// Docker executable [env: TETHER_DOCKER_BIN]
    #[arg(long)]
    docker_bin: Option<PathBuf>,

    /// Docker daemon address [env: TETHER_DOCKER_HOST]
    #[arg(long)]
    docker_host: Option<String>,

    /// Command to run in the container (default: tail -f /dev/null)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

impl Args {
    fn grace(&self) -> Duration {
        grace_period(self.grace_secs.unwrap_or_else(env::grace_secs))
    }

    fn config(&self) -> LifecycleConfig {
        let policy = if self.exact_tag { MatchPolicy::Exact } else { MatchPolicy::Repository };
        LifecycleConfig::default().command(self.command.clone()).match_policy(policy)
    }

    fn docker_client(&self) -> DockerCliClient {
        let mut client = DockerCliClient::new();
        if let Some(bin) = self.docker_bin.clone().or_else(env::docker_bin) {
            client = client.with_binary(bin);
        }
        if let Some(host) = self.docker_host.clone().or_else(env::docker_host) {
            client = client.with_host(host);
        }
        client
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing();

    if let Err(e) = run(args).await {
        match e.downcast_ref::<ExitError>() {
            Some(exit) => {
                eprintln!("tether: {}", exit);
                std::process::exit(exit.code);
            }
            None => {
                eprintln!("tether: {:#}", e);
                std::process::exit(EXIT_FAILED);
            }
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_new(env::log_filter())
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn run(args: Args) -> Result<()> {
    let grace = args.grace();
    let trigger_after = args.run_for_secs.map(Duration::from_secs);
    let mut orchestrator =
        Orchestrator::new(args.docker_client(), args.image.clone(), args.config());

    let cancel = CancellationToken::new();
    let (trigger_tx, trigger_rx) = oneshot::channel();
    let watcher = tokio::spawn(watch_interrupts(trigger_tx, cancel.clone()));

    let trigger = async move {
        match trigger_after {
            Some(after) => tokio::select! {
                _ = tokio::time::sleep(after) => {
                    tracing::info!(
                        after_secs = after.as_secs(),
                        "run time elapsed, terminating container"
                    );
                }
                _ = trigger_rx => {}
            },
            None => {
                let _ = trigger_rx.await;
            }
        }
    };

    let outcome = orchestrator.run(grace, trigger, cancel).await;
    watcher.abort();
    report(&orchestrator, outcome)
}

/// Print the audit line and turn the final state into the process outcome.
fn report<C: RuntimeClient>(
    orchestrator: &Orchestrator<C>,
    outcome: Result<tether_engine::LifecycleResult, tether_engine::LifecycleError>,
) -> Result<()> {
    let (result, error) = match outcome {
        Ok(result) => (result, None),
        Err(e) => (orchestrator.result(), Some(e)),
    };
    println!("{}", Report::new(&result, error.as_ref().map(|e| e.to_string())).to_json()?);

    if let Some(e) = error {
        return Err(ExitError::new(EXIT_FAILED, e.to_string()).into());
    }
    output::outcome_status(&result)?;
    Ok(())
}

/// First Ctrl-C triggers termination; a second one cancels it.
async fn watch_interrupts(trigger: oneshot::Sender<()>, cancel: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Keep the sender alive so a dropped channel is not read as a trigger
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        let _trigger = trigger;
        std::future::pending::<()>().await;
        return;
    }
    if trigger.send(()).is_ok() {
        tracing::info!("interrupt received, terminating container (Ctrl-C again to cancel)");
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
    }
    tracing::warn!("interrupt received during termination, cancelling");
    cancel.cancel();
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
