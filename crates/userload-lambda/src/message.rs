//! Outbound wire messages
//!
//! Every message is wrapped as `{"payload": ..., "headers": {}, "properties": {}}`. Consumers
//! detect this (legacy) envelope by the presence of `headers`, so both keys are always
//! emitted and always empty.

use crate::task::TaskContext;
use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Task type announced by activity messages
pub const CREATE_USER_TASK_TYPE: &str = "CREATE_USER";

/// Keys a create-user payload sets on top of the context
pub const CREATE_USER_KEYS: &[&str] = &["user"];

/// Keys an activity payload sets on top of the context
pub const ACTIVITY_KEYS: &[&str] = &["taskType", "task"];

/// Always serializes as `{}`
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Empty {}

#[derive(Debug, Serialize)]
pub struct Envelope<P> {
    pub payload: P,
    pub headers: Empty,
    pub properties: Empty,
}

impl<P: Serialize> Envelope<P> {
    pub fn new(payload: P) -> Self {
        Self {
            payload,
            headers: Empty {},
            properties: Empty {},
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// One CSV row: email first, optional name second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserRecord<'a> {
    pub email: &'a str,
    pub name: Option<&'a str>,
}

/// A [`TaskContext`] flattened into a payload, minus the metadata entries the payload
/// sets itself
#[derive(Debug, Clone, Copy)]
pub struct ContextFields<'a> {
    context: &'a TaskContext,
    shadowed: &'static [&'static str],
}

impl<'a> ContextFields<'a> {
    pub fn new(context: &'a TaskContext, shadowed: &'static [&'static str]) -> Self {
        Self { context, shadowed }
    }
}

impl Serialize for ContextFields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, node) in self.context.metadata().iter() {
            if !self.shadowed.contains(&key.as_str()) {
                map.serialize_entry(key, node)?;
            }
        }
        map.serialize_entry("realm", self.context.realm())?;
        map.serialize_entry("taskId", self.context.task_id())?;
        map.end()
    }
}

#[derive(Debug, Serialize)]
pub struct CreateUserPayload<'a> {
    #[serde(flatten)]
    pub context: ContextFields<'a>,
    pub user: UserRecord<'a>,
}

#[derive(Debug, Serialize)]
pub struct ActivityPayload<'a> {
    #[serde(flatten)]
    pub context: ContextFields<'a>,
    #[serde(rename = "taskType")]
    pub task_type: &'static str,
    pub task: ActivityTask<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTask<'a> {
    pub file_name: &'a str,
    pub uploaded_time: String,
    pub expected: u64,
}

/// ISO-8601 with microseconds and a literal `Z`, e.g. `2012-01-01T12:00:00.000000Z`
pub fn format_uploaded_time(uploaded_at: &DateTime<Utc>) -> String {
    uploaded_at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

pub fn create_user_message(
    context: &TaskContext,
    user: UserRecord<'_>,
) -> serde_json::Result<String> {
    Envelope::new(CreateUserPayload {
        context: ContextFields::new(context, CREATE_USER_KEYS),
        user,
    })
    .to_json()
}

pub fn activity_message(
    context: &TaskContext,
    file_name: &str,
    uploaded_at: &DateTime<Utc>,
    expected: u64,
) -> serde_json::Result<String> {
    Envelope::new(ActivityPayload {
        context: ContextFields::new(context, ACTIVITY_KEYS),
        task_type: CREATE_USER_TASK_TYPE,
        task: ActivityTask {
            file_name,
            uploaded_time: format_uploaded_time(uploaded_at),
            expected,
        },
    })
    .to_json()
}
