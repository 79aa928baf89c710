//! Records returned by the backend services and the response envelope they
//! arrive in.
//!
//! Every list item implements [`Keyed`]; the key is what selection and
//! client-side sorting operate on.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::fetch::FetchError;
use crate::paging::Pagination;

/// Identity of a list item.
pub trait Keyed {
    fn key(&self) -> String;
}

/// A catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub asset_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, Value>,
    #[serde(default)]
    pub versions: BTreeMap<String, Value>,
    #[serde(rename = "depends-on", default)]
    pub depends_on: Vec<String>,
    #[serde(rename = "published-on", default)]
    pub published_on: Option<DateTime<Utc>>,
    #[serde(rename = "last-discovered-at", default)]
    pub last_discovered_at: Option<DateTime<Utc>>,
}

impl Keyed for Asset {
    fn key(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(alias = "data-type", default)]
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Featureset {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub inserted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl Keyed for Featureset {
    fn key(&self) -> String {
        versioned_key(&self.name, &self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metricset {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub inserted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub metrics: Vec<DeequMetric>,
}

impl Keyed for Metricset {
    fn key(&self) -> String {
        versioned_key(&self.name, &self.version)
    }
}

fn versioned_key(name: &str, version: &str) -> String {
    if version.is_empty() {
        name.to_string()
    } else {
        format!("{}@{}", name, version)
    }
}

/// One Deequ analysis run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeequMetric {
    #[serde(default)]
    pub result_key: DeequResultKey,
    #[serde(default)]
    pub analyzer_context: DeequAnalyzerContext,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeequResultKey {
    #[serde(default)]
    pub data_set_date: i64,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeequAnalyzerContext {
    #[serde(default)]
    pub metric_map: Vec<DeequMetricInstance>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeequMetricInstance {
    #[serde(default)]
    pub analyzer: DeequAnalyzer,
    #[serde(default)]
    pub metric: DeequMetricValue,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeequAnalyzer {
    #[serde(default)]
    pub analyzer_name: String,
    #[serde(default)]
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeequMetricValue {
    #[serde(default)]
    pub metric_name: String,
    #[serde(default)]
    pub entity: String,
    #[serde(default)]
    pub instance: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: f64,
}

/// A Kafka Connect connector with its expanded `status` and `info` blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub name: String,
    #[serde(default)]
    pub status: ConnectorStatus,
    #[serde(default)]
    pub info: ConnectorInfo,
}

impl Keyed for Connector {
    fn key(&self) -> String {
        self.name.clone()
    }
}

impl Connector {
    /// The connector class from its config, if present.
    pub fn class(&self) -> Option<&str> {
        self.info
            .config
            .get("connector.class")
            .and_then(|v| v.as_str())
    }

    /// Tasks not in the `RUNNING` state.
    pub fn failed_tasks(&self) -> impl Iterator<Item = &TaskState> {
        self.status.tasks.iter().filter(|t| !t.is_running())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConnectorStatus {
    #[serde(default)]
    pub connector: WorkerState,
    #[serde(default)]
    pub tasks: Vec<TaskState>,
    #[serde(rename = "type", default)]
    pub connector_type: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkerState {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub worker_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskState {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub worker_id: String,
    #[serde(default)]
    pub trace: Option<String>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.state == "RUNNING"
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConnectorInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub config: BTreeMap<String, Value>,
    #[serde(rename = "type", default)]
    pub connector_type: String,
}

/// Latest registered version of a Schema Registry subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSubject {
    pub subject: String,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub id: i64,
    #[serde(default = "default_schema_type")]
    pub schema_type: String,
    #[serde(default)]
    pub schema: String,
}

fn default_schema_type() -> String {
    "AVRO".to_string()
}

impl Keyed for SchemaSubject {
    fn key(&self) -> String {
        self.subject.clone()
    }
}

/// A decoded response body.
///
/// Backends answer either with a paged envelope
/// `{"data": [...], "pagination": {...}}`, a bare array, or a single bare
/// object.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    Paged {
        items: Vec<T>,
        pagination: Pagination,
    },
    List(Vec<T>),
    Single(T),
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<Vec<T>>,
    pagination: Pagination,
}

impl<T: DeserializeOwned> Payload<T> {
    pub fn decode(value: Value) -> Result<Self, FetchError> {
        let paged = value.get("pagination").is_some();
        let decoded = match value {
            Value::Null => Ok(Payload::List(Vec::new())),
            Value::Array(_) => serde_json::from_value(value).map(Payload::List),
            Value::Object(_) if paged => {
                serde_json::from_value::<Envelope<T>>(value).map(|env| Payload::Paged {
                    items: env.data.unwrap_or_default(),
                    pagination: env.pagination,
                })
            }
            other => serde_json::from_value(other).map(Payload::Single),
        };
        decoded.map_err(|e| FetchError::Decode {
            message: format!("unexpected response shape: {}", e),
        })
    }
}

impl<T> Payload<T> {
    /// Items in server order, with the server's pagination if any.
    pub fn into_parts(self) -> (Vec<T>, Option<Pagination>) {
        match self {
            Payload::Paged { items, pagination } => (items, Some(pagination)),
            Payload::List(items) => (items, None),
            Payload::Single(item) => (vec![item], None),
        }
    }
}
