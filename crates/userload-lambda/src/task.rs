//! Task identity: object key layout, task id and the shared per-file context

use crate::error::ProcessError;
use crate::metadata::CompiledMetadata;
use serde::Serialize;
use tracing::warn;

/// Context keys derived from the object itself. Metadata entries with these names are
/// dropped so the derived values always win.
pub const CONTEXT_KEYS: [&str; 2] = ["realm", "taskId"];

/// Positional view of an upload key: `<env>/<operation>/<realm>/<file name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKey {
    pub realm: String,
    pub file_name: String,
}

impl ObjectKey {
    pub fn parse(key: &str) -> Result<Self, ProcessError> {
        let mut segments = key.split('/').skip(2);
        match (segments.next(), segments.next()) {
            (Some(realm), Some(file_name)) if !realm.is_empty() && !file_name.is_empty() => {
                Ok(Self {
                    realm: realm.to_string(),
                    file_name: file_name.to_string(),
                })
            }
            _ => Err(ProcessError::InvalidObjectKey(key.to_string())),
        }
    }
}

/// `<epoch millis>-<file name>`
pub fn make_task_id(uploaded_at_millis: i64, file_name: &str) -> String {
    format!("{uploaded_at_millis}-{file_name}")
}

/// Metadata plus the derived realm and task id, shared by every message of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskContext {
    #[serde(flatten)]
    metadata: CompiledMetadata,
    realm: String,
    #[serde(rename = "taskId")]
    task_id: String,
}

impl TaskContext {
    pub fn new(
        mut metadata: CompiledMetadata,
        realm: impl Into<String>,
        task_id: impl Into<String>,
    ) -> Self {
        for key in CONTEXT_KEYS {
            if metadata.remove(key).is_some() {
                warn!(key, "Dropping metadata entry shadowed by a derived field");
            }
        }

        Self {
            metadata,
            realm: realm.into(),
            task_id: task_id.into(),
        }
    }

    pub fn metadata(&self) -> &CompiledMetadata {
        &self.metadata
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }
}
