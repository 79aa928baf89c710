//! Backend sources, one per resource kind.
//!
//! A [`Source`] turns a [`PageRequest`] into a call against its backend
//! service and decodes the answer into a [`Payload`]. Sources resolve their
//! base URL through the [`ServiceLocator`] on every call and perform I/O only
//! through the shared [`Fetcher`].
//!
//! | Source | Service | Paging |
//! |--------|---------|--------|
//! | [`AssetSearch`] | `catalogue` | remote |
//! | [`AssetDetail`] | `catalogue` | remote (single item) |
//! | [`Featuresets`] | `featurestore` | remote |
//! | [`Metricsets`] | `metricstore` | remote |
//! | [`Connectors`] | `kafka_connect` | local |
//! | [`SchemaSubjects`] | `kafka_schema_registry` | local |

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::fetch::{FetchError, Fetcher, Request};
use crate::locator::{
    ServiceLocator, CATALOGUE, FEATURESTORE, KAFKA_CONNECT, KAFKA_SCHEMA_REGISTRY, METRICSTORE,
};
use crate::models::{
    Asset, Connector, ConnectorInfo, ConnectorStatus, Featureset, Keyed, Metricset, Payload,
    SchemaSubject,
};
use crate::query::classify;
use crate::state::{PageRequest, PagingMode};

#[async_trait]
pub trait Source: Send + Sync {
    type Item: Keyed + Clone + Send + Sync + 'static;

    /// How the store should page this source's results.
    fn mode(&self) -> PagingMode {
        PagingMode::Remote
    }

    async fn fetch(&self, request: &PageRequest) -> Result<Payload<Self::Item>, FetchError>;
}

/// Fetcher and locator shared by all sources.
#[derive(Clone)]
pub struct Backend {
    fetcher: Arc<dyn Fetcher>,
    locator: Arc<ServiceLocator>,
}

impl Backend {
    pub fn new(fetcher: Arc<dyn Fetcher>, locator: Arc<ServiceLocator>) -> Self {
        Self { fetcher, locator }
    }

    pub fn url(&self, service: &str) -> String {
        self.locator.resolve(service)
    }

    pub fn locator(&self) -> &ServiceLocator {
        &self.locator
    }

    async fn call(&self, request: Request) -> Result<serde_json::Value, FetchError> {
        self.fetcher.fetch(request).await
    }
}

/// Catalogue search by exact name, tag list or free text.
pub struct AssetSearch {
    backend: Backend,
}

impl AssetSearch {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Source for AssetSearch {
    type Item = Asset;

    async fn fetch(&self, request: &PageRequest) -> Result<Payload<Asset>, FetchError> {
        let http = classify(&request.query).to_request(&self.backend.url(CATALOGUE), request.window);
        Payload::decode(self.backend.call(http).await?)
    }
}

/// A single catalogue asset by name.
pub struct AssetDetail {
    backend: Backend,
}

impl AssetDetail {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Source for AssetDetail {
    type Item = Asset;

    async fn fetch(&self, request: &PageRequest) -> Result<Payload<Asset>, FetchError> {
        let url = format!(
            "{}/asset/name/{}",
            self.backend.url(CATALOGUE),
            urlencoding::encode(request.query.trim())
        );
        Payload::decode(self.backend.call(Request::get(url)).await?)
    }
}

/// Featuresets recorded for an asset.
pub struct Featuresets {
    backend: Backend,
}

impl Featuresets {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Source for Featuresets {
    type Item = Featureset;

    async fn fetch(&self, request: &PageRequest) -> Result<Payload<Featureset>, FetchError> {
        let url = format!(
            "{}/featureset/name/{}?limit={}&page={}",
            self.backend.url(FEATURESTORE),
            urlencoding::encode(request.query.trim()),
            request.window.limit,
            request.window.page
        );
        Payload::decode(self.backend.call(Request::get(url)).await?)
    }
}

/// Metricsets recorded for an asset.
pub struct Metricsets {
    backend: Backend,
}

impl Metricsets {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Source for Metricsets {
    type Item = Metricset;

    async fn fetch(&self, request: &PageRequest) -> Result<Payload<Metricset>, FetchError> {
        let url = format!(
            "{}/metricstore/name/{}?limit={}&page={}",
            self.backend.url(METRICSTORE),
            urlencoding::encode(request.query.trim()),
            request.window.limit,
            request.window.page
        );
        Payload::decode(self.backend.call(Request::get(url)).await?)
    }
}

/// Kafka Connect connectors, optionally narrowed to one name.
pub struct Connectors {
    backend: Backend,
}

impl Connectors {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[derive(Deserialize)]
struct ExpandedConnector {
    #[serde(default)]
    status: ConnectorStatus,
    #[serde(default)]
    info: ConnectorInfo,
}

#[async_trait]
impl Source for Connectors {
    type Item = Connector;

    fn mode(&self) -> PagingMode {
        PagingMode::Local
    }

    async fn fetch(&self, request: &PageRequest) -> Result<Payload<Connector>, FetchError> {
        let base = self.backend.url(KAFKA_CONNECT);
        let url = format!("{}/connectors?expand=status&expand=info", base);
        let value = self.backend.call(Request::get(url)).await?;

        let mut expanded: BTreeMap<String, ExpandedConnector> =
            serde_json::from_value(value).map_err(|e| FetchError::Decode {
                message: format!("unexpected connector listing: {}", e),
            })?;

        if expanded.is_empty() {
            return Err(FetchError::Missing {
                message: format!("no data returned from service at {}", base),
            });
        }

        let wanted = request.query.trim();
        if !wanted.is_empty() {
            expanded = match expanded.remove_entry(wanted) {
                Some((name, entry)) => BTreeMap::from([(name, entry)]),
                None => {
                    return Err(FetchError::Missing {
                        message: format!("no connector named {} found", wanted),
                    })
                }
            };
        }

        Ok(Payload::List(
            expanded
                .into_iter()
                .map(|(name, entry)| Connector {
                    name,
                    status: entry.status,
                    info: entry.info,
                })
                .collect(),
        ))
    }
}

/// Ask Kafka Connect to restart a connector and its failed tasks.
pub async fn restart_connector(backend: &Backend, name: &str) -> Result<(), FetchError> {
    let url = format!(
        "{}/connectors/{}/restart?includeTasks=true&onlyFailed=true",
        backend.url(KAFKA_CONNECT),
        urlencoding::encode(name)
    );
    backend.call(Request::post(url, None)).await?;
    tracing::info!(connector = name, "restart requested");
    Ok(())
}

/// Latest versions of Schema Registry subjects, optionally just one.
pub struct SchemaSubjects {
    backend: Backend,
}

impl SchemaSubjects {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

async fn latest_version(
    backend: &Backend,
    base: &str,
    subject: &str,
) -> Result<SchemaSubject, FetchError> {
    let url = format!(
        "{}/subjects/{}/versions/latest",
        base,
        urlencoding::encode(subject)
    );
    let value = backend.call(Request::get(url)).await?;
    serde_json::from_value(value).map_err(|e| FetchError::Decode {
        message: format!("unexpected schema for {}: {}", subject, e),
    })
}

#[async_trait]
impl Source for SchemaSubjects {
    type Item = SchemaSubject;

    fn mode(&self) -> PagingMode {
        PagingMode::Local
    }

    async fn fetch(&self, request: &PageRequest) -> Result<Payload<SchemaSubject>, FetchError> {
        let base = self.backend.url(KAFKA_SCHEMA_REGISTRY);

        let wanted = request.query.trim();
        if !wanted.is_empty() {
            return latest_version(&self.backend, &base, wanted)
                .await
                .map(Payload::Single);
        }

        let value = self
            .backend
            .call(Request::get(format!("{}/subjects", base)))
            .await?;
        let subjects: Vec<String> = serde_json::from_value(value).map_err(|e| FetchError::Decode {
            message: format!("unexpected subject listing: {}", e),
        })?;

        let mut tasks = JoinSet::new();
        for subject in subjects {
            let backend = self.backend.clone();
            let base = base.clone();
            tasks.spawn(async move {
                let result = latest_version(&backend, &base, &subject).await;
                (subject, result)
            });
        }

        let mut schemas = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(schema))) => schemas.push(schema),
                Ok((subject, Err(e))) => {
                    tracing::warn!(subject = %subject, error = %e, "skipping schema subject");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "schema lookup task failed");
                }
            }
        }

        Ok(Payload::List(schemas))
    }
}
