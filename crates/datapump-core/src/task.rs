//! Task type and the worker boot payload codec.

use crate::{CoreError, TaskId};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// A Task represents a single requested unit of work: one extraction run
/// for one service, awaiting execution on an ephemeral worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,

    /// Queue this task is (or was) enqueued on.
    pub queue: String,

    /// Name of the service whose extraction this task runs.
    pub service: String,

    /// Region the worker for this task must be provisioned in.
    pub region: String,

    /// Reference to the execution entrypoint the worker invokes
    /// (script/program path; opaque to the orchestrator).
    pub entrypoint: String,

    /// Storage and dataset bindings for the task's output.
    pub bindings: ResourceBindings,

    /// Opaque service-specific parameters, forwarded verbatim.
    pub params: serde_json::Value,
}

impl Task {
    /// Create a new Task with a generated id.
    pub fn new(
        service: impl Into<String>,
        queue: impl Into<String>,
        region: impl Into<String>,
        entrypoint: impl Into<String>,
    ) -> Self {
        Self {
            id: TaskId::generate(),
            queue: queue.into(),
            service: service.into(),
            region: region.into(),
            entrypoint: entrypoint.into(),
            bindings: ResourceBindings::default(),
            params: serde_json::Value::Null,
        }
    }

    /// Builder method to set a specific ID (useful for testing).
    pub fn with_id(mut self, id: TaskId) -> Self {
        self.id = id;
        self
    }

    /// Builder method to set resource bindings.
    pub fn with_bindings(mut self, bucket: impl Into<String>, dataset: impl Into<String>) -> Self {
        self.bindings = ResourceBindings {
            bucket: bucket.into(),
            dataset: dataset.into(),
        };
        self
    }

    /// Builder method to set the parameter blob.
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }

    /// Encode this task as a base64-url JSON payload.
    ///
    /// This is the form handed to a worker as boot metadata; the worker
    /// decodes it to recover the entrypoint and parameters.
    pub fn encode_payload(&self) -> Result<String, CoreError> {
        let json = serde_json::to_vec(self).map_err(|e| CoreError::Serialization(e.to_string()))?;
        Ok(URL_SAFE.encode(json))
    }

    /// Decode a task from a base64-url JSON payload.
    pub fn decode_payload(payload: &str) -> Result<Self, CoreError> {
        let json = URL_SAFE
            .decode(payload)
            .map_err(|e| CoreError::InvalidPayload(e.to_string()))?;
        serde_json::from_slice(&json).map_err(|e| CoreError::InvalidPayload(e.to_string()))
    }
}

/// Storage and dataset bindings for a task's output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceBindings {
    /// Object storage bucket the task writes intermediate files to.
    pub bucket: String,

    /// Warehouse dataset the task loads results into.
    pub dataset: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_round_trip() {
        let task = Task::new("audience-report", "tasks-l1", "europe-west1", "run.sh")
            .with_bindings("report-bucket", "report_dataset")
            .with_params(serde_json::json!({ "advertiser_id": "1234" }));

        let payload = task.encode_payload().unwrap();
        let decoded = Task::decode_payload(&payload).unwrap();
        assert_eq!(decoded, task);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(Task::decode_payload("not base64!").is_err());
        // Valid base64 but not a task payload.
        assert!(Task::decode_payload(&URL_SAFE.encode(b"{}")).is_err());
    }
}
