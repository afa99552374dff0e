//! Host and container inventory agent.
//!
//! Each cycle gathers hardware facts through a [`probe::HardwareProbe`], the
//! running containers through a [`containers::ContainerRuntime`], builds one
//! [`types::InfoBase`] and hands it to a [`reporter::SnapshotSink`].

pub mod cli;
pub mod config;
pub mod containers;
pub mod docker;
pub mod error;
pub mod hardware;
pub mod metrics;
pub mod probe;
pub mod reporter;
pub mod scheduler;
pub mod snapshot;
pub mod types;
