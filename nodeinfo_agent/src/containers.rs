//! Running-container inventory.

use crate::error::RuntimeError;
use crate::types::ContainerRecord;
use async_trait::async_trait;
use tracing::debug;

/// List + inspect against a container runtime.
#[async_trait]
pub trait ContainerRuntime: Send {
    /// Ids of the containers currently running.
    async fn list_running(&mut self) -> Result<Vec<String>, RuntimeError>;
    async fn inspect(&mut self, id: &str) -> Result<ContainerRecord, RuntimeError>;
}

pub struct ContainerCollector {
    runtime: Box<dyn ContainerRuntime>,
}

impl ContainerCollector {
    pub fn new(runtime: Box<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    /// Inspect every running container, in list order.
    ///
    /// Any list or inspect failure aborts the whole collection. A container
    /// that vanished between list and inspect is skipped.
    pub async fn collect(&mut self) -> Result<Vec<ContainerRecord>, RuntimeError> {
        let ids = self.runtime.list_running().await?;
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            match self.runtime.inspect(&id).await {
                Ok(record) => {
                    if record.id().is_some_and(|got| got != id) {
                        return Err(RuntimeError::Inspect {
                            reason: format!("runtime returned record for {:?}", record.id()),
                            id,
                        });
                    }
                    records.push(record);
                }
                Err(RuntimeError::NotFound(gone)) => {
                    debug!(container = %gone, "container exited before inspect, skipping");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }
}
