//! The fetch boundary.
//!
//! `RecordSource` is transport-agnostic and returns futures, leaving the
//! caller to decide how to drive them. Tests substitute `MockRecordSource`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use agentdesk_core::{Credentials, FetchError, Record, ResourceKind};
use futures::future::BoxFuture;
use serde_json::Value;

// =============================================================================
// RecordSource Trait
// =============================================================================

/// Where a resource's records come from.
#[cfg_attr(test, mockall::automock)]
pub trait RecordSource: Send + Sync {
    /// Fetch every record of a resource.
    fn fetch_all(
        &self,
        resource: ResourceKind,
        credentials: &Credentials,
    ) -> BoxFuture<'static, Result<Vec<Record>, FetchError>>;

    /// Create a record and return it as stored by the backend.
    fn create(
        &self,
        resource: ResourceKind,
        credentials: &Credentials,
        payload: Value,
    ) -> BoxFuture<'static, Result<Record, FetchError>>;
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode an endpoint body into records.
///
/// Accepts a bare array or a `{"data": [...]}` envelope.
pub fn decode_records(bytes: &[u8]) -> Result<Vec<Record>, FetchError> {
    let mut body = parse_body(bytes)?;
    let items = std::mem::take(record_items(&mut body)?);

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let kind = json_type(&item);
            Record::from_value(item).ok_or_else(|| {
                FetchError::Decode(format!("element {} is {}, not an object", index, kind))
            })
        })
        .collect()
}

fn parse_body(bytes: &[u8]) -> Result<Value, FetchError> {
    serde_json::from_slice(bytes).map_err(|e| FetchError::Decode(e.to_string()))
}

/// The record array inside a body, whichever shape it has.
fn record_items(body: &mut Value) -> Result<&mut Vec<Value>, FetchError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(envelope) => match envelope.get_mut("data") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(FetchError::Decode(
                "expected an array or an object with a 'data' array".to_string(),
            )),
        },
        other => Err(FetchError::Decode(format!(
            "expected an array, found {}",
            json_type(other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// JSON Directory Source
// =============================================================================

/// Serves each resource from `<root>/<resource-slug>.json`.
///
/// An unreadable file is reported as a network failure, malformed contents
/// as a decode failure.
#[derive(Clone)]
pub struct JsonDirSource {
    root: PathBuf,
    /// Serializes read-modify-write cycles in `create`.
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl JsonDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing a resource.
    pub fn path_for(&self, resource: ResourceKind) -> PathBuf {
        self.root.join(format!("{}.json", resource.slug()))
    }
}

impl RecordSource for JsonDirSource {
    fn fetch_all(
        &self,
        resource: ResourceKind,
        credentials: &Credentials,
    ) -> BoxFuture<'static, Result<Vec<Record>, FetchError>> {
        let path = self.path_for(resource);
        let agent = credentials.agent_id.clone();

        Box::pin(async move {
            tracing::debug!("Fetching {} for agent '{}' from {}", resource, agent, path.display());
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| FetchError::Network(format!("{}: {}", path.display(), e)))?;
            let records = decode_records(&bytes)?;
            tracing::debug!("Fetched {} {} records", records.len(), resource);
            Ok(records)
        })
    }

    fn create(
        &self,
        resource: ResourceKind,
        credentials: &Credentials,
        payload: Value,
    ) -> BoxFuture<'static, Result<Record, FetchError>> {
        let root = self.root.clone();
        let path = self.path_for(resource);
        let write_lock = self.write_lock.clone();
        let agent = credentials.agent_id.clone();

        Box::pin(async move {
            let mut record = Record::from_value(payload).ok_or_else(|| {
                FetchError::Decode("create payload is not a JSON object".to_string())
            })?;
            if record.id().is_none() {
                record = with_generated_id(record);
            }

            let _guard = write_lock.lock().await;

            // Keep the file's shape: an envelope stays an envelope.
            let mut body = match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    decode_records(&bytes)?;
                    parse_body(&bytes)?
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Value::Array(Vec::new()),
                Err(e) => {
                    return Err(FetchError::Network(format!("{}: {}", path.display(), e)))
                }
            };
            record_items(&mut body)?.push(record.clone().into_value());

            let body = serde_json::to_vec_pretty(&body)
                .map_err(|e| FetchError::Decode(e.to_string()))?;
            tokio::fs::create_dir_all(&root)
                .await
                .map_err(|e| FetchError::Network(format!("{}: {}", root.display(), e)))?;
            tokio::fs::write(&path, body)
                .await
                .map_err(|e| FetchError::Network(format!("{}: {}", path.display(), e)))?;

            tracing::info!(
                "Agent '{}' created {} record {:?}",
                agent,
                resource,
                record.id().map(|id| id.0)
            );
            Ok(record)
        })
    }
}

fn with_generated_id(record: Record) -> Record {
    let mut fields = match record.into_value() {
        Value::Object(fields) => fields,
        _ => serde_json::Map::new(),
    };
    fields.insert(
        "_id".to_string(),
        Value::String(uuid::Uuid::new_v4().to_string()),
    );
    Record::new(fields)
}

// =============================================================================
// Tests
// =============================================================================
