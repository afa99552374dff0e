//! Snapshot delivery: JSON body echoed to stdout, then one HTTP POST.

use crate::error::DeliveryError;
use crate::types::InfoBase;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::io::Write;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Where finished snapshots go.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    async fn send(&self, snapshot: &InfoBase) -> Result<(), DeliveryError>;
}

type Echo = Mutex<Box<dyn Write + Send>>;

pub struct HttpReporter {
    client: reqwest::Client,
    url: String,
    echo: Option<Echo>,
}

impl HttpReporter {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            echo: Some(Mutex::new(Box::new(std::io::stdout()))),
        }
    }

    /// Toggle writing each body to stdout (on by default).
    pub fn with_echo(mut self, echo: bool) -> Self {
        if !echo {
            self.echo = None;
        } else if self.echo.is_none() {
            self.echo = Some(Mutex::new(Box::new(std::io::stdout())));
        }
        self
    }

    /// Echo bodies into `w` instead of stdout.
    pub fn with_echo_writer(mut self, w: impl Write + Send + 'static) -> Self {
        self.echo = Some(Mutex::new(Box::new(w)));
        self
    }

    fn echo(&self, body: &[u8]) {
        let Some(echo) = &self.echo else {
            return;
        };
        let Ok(mut out) = echo.lock() else {
            warn!("snapshot echo writer poisoned");
            return;
        };
        let res = out
            .write_all(body)
            .and_then(|_| out.write_all(b"\n"))
            .and_then(|_| out.flush());
        if let Err(e) = res {
            warn!("writing snapshot to stdout failed: {e}");
        }
    }
}

#[async_trait]
impl SnapshotSink for HttpReporter {
    async fn send(&self, snapshot: &InfoBase) -> Result<(), DeliveryError> {
        let body = serde_json::to_vec(snapshot)?;

        // echoed whether or not the POST below succeeds
        self.echo(&body);

        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|source| DeliveryError::Request {
                url: self.url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DeliveryError::Status {
                url: self.url.clone(),
                status,
            });
        }
        debug!(url = %self.url, %status, "snapshot delivered");
        Ok(())
    }
}
