//! Error types for each stage of a collection cycle.

use std::path::PathBuf;
use thiserror::Error;

/// A single hardware provider call failed. Never fatal to a cycle.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no filesystem mounted at {0}")]
    MountNotFound(PathBuf),

    #[error("{what} not available: {reason}")]
    Unavailable { what: &'static str, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The container runtime could not be reached or queried.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("cannot connect to container runtime: {0}")]
    Connect(String),

    #[error("listing running containers failed: {0}")]
    List(String),

    #[error("inspecting container {id} failed: {reason}")]
    Inspect { id: String, reason: String },

    #[error("container {0} no longer exists")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("serializing snapshot failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("endpoint {url} answered {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reasons a whole cycle is abandoned before anything is sent.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Containers(#[from] RuntimeError),
}
