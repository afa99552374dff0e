//! Docker Engine API client (local socket / DOCKER_HOST) via bollard.

use crate::containers::ContainerRuntime;
use crate::error::RuntimeError;
use crate::types::ContainerRecord;
use async_trait::async_trait;
use bollard::container::{InspectContainerOptions, ListContainersOptions};
use bollard::errors::Error as BollardError;
use bollard::Docker;

/// Connects on first use and retries the connection on every later call
/// until it succeeds, so a runtime that starts after the agent is picked up.
#[derive(Default)]
pub struct DockerRuntime {
    client: Option<Docker>,
}

impl DockerRuntime {
    /// Connect eagerly; used where a missing runtime must surface at startup.
    pub fn connect() -> Result<Self, RuntimeError> {
        let client = local_client()?;
        Ok(Self {
            client: Some(client),
        })
    }

    pub fn lazy() -> Self {
        Self::default()
    }

    fn client(&mut self) -> Result<&Docker, RuntimeError> {
        let client = match self.client.take() {
            Some(c) => c,
            None => local_client()?,
        };
        let client: &Docker = self.client.insert(client);
        Ok(client)
    }
}

fn local_client() -> Result<Docker, RuntimeError> {
    Docker::connect_with_local_defaults().map_err(|e| RuntimeError::Connect(e.to_string()))
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_running(&mut self) -> Result<Vec<String>, RuntimeError> {
        let client = self.client()?;
        // default options: running containers only
        let summaries = client
            .list_containers(Some(ListContainersOptions::<String>::default()))
            .await
            .map_err(|e| RuntimeError::List(e.to_string()))?;
        Ok(summaries.into_iter().filter_map(|c| c.id).collect())
    }

    async fn inspect(&mut self, id: &str) -> Result<ContainerRecord, RuntimeError> {
        let client = self.client()?;
        let detail = client
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| match e {
                BollardError::DockerResponseServerError {
                    status_code: 404, ..
                } => RuntimeError::NotFound(id.to_string()),
                other => RuntimeError::Inspect {
                    id: id.to_string(),
                    reason: other.to_string(),
                },
            })?;
        let value = serde_json::to_value(detail).map_err(|e| RuntimeError::Inspect {
            id: id.to_string(),
            reason: e.to_string(),
        })?;
        Ok(ContainerRecord(value))
    }
}
