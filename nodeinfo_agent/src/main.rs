//! Entry point for nodeinfo_agent. Parses args, loads configuration, runs the scheduler.

use nodeinfo_agent::cli::{parse_args, Command};
use nodeinfo_agent::config::{self, Configuration};
use nodeinfo_agent::containers::ContainerCollector;
use nodeinfo_agent::docker::DockerRuntime;
use nodeinfo_agent::hardware::HardwareCollector;
use nodeinfo_agent::metrics::SysinfoProbe;
use nodeinfo_agent::reporter::HttpReporter;
use nodeinfo_agent::scheduler::{Cycle, Scheduler};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging() -> anyhow::Result<()> {
    // stdout carries snapshot bodies; logs go to stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nodeinfo_agent=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("initialising logging: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = match parse_args(std::env::args()) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help(text)) => {
            println!("{text}");
            return Ok(ExitCode::SUCCESS);
        }
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(ExitCode::from(2));
        }
    };
    init_logging()?;

    let path = config::resolve_path(args.config);
    let mut cfg = Configuration::load(&path);
    if args.once {
        cfg.wait_time = 0;
    }
    info!(
        path = %path.display(),
        url = %cfg.url,
        wait_time = cfg.wait_time,
        "configuration loaded"
    );

    // A single-shot run has nothing to retry later, so a runtime that cannot
    // even be configured is a startup failure.
    let runtime = if cfg.interval().is_none() {
        match DockerRuntime::connect() {
            Ok(rt) => rt,
            Err(e) => {
                error!("{e}");
                return Ok(ExitCode::FAILURE);
            }
        }
    } else {
        DockerRuntime::lazy()
    };

    let cycle = Cycle::new(
        HardwareCollector::new(Box::new(SysinfoProbe::new())),
        ContainerCollector::new(Box::new(runtime)),
        Box::new(HttpReporter::new(cfg.url.clone())),
    );
    let mut scheduler = Scheduler::new(cfg, cycle);

    tokio::select! {
        res = scheduler.run() => match res {
            Ok(()) => Ok(ExitCode::SUCCESS),
            Err(e) => {
                error!("{e}");
                Ok(ExitCode::FAILURE)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
            Ok(ExitCode::SUCCESS)
        }
    }
}
