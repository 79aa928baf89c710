//! The composed state container: one [`Store`] per resource kind.
//!
//! Stores are independent of each other. They only share the [`Backend`]
//! (fetcher + locator) they were built with.

use std::sync::Arc;

use crate::config::Config;
use crate::fetch::{FetchError, Fetcher, HttpFetcher};
use crate::locator::ServiceLocator;
use crate::sources::{
    restart_connector, AssetDetail, AssetSearch, Backend, Connectors, Featuresets, Metricsets,
    SchemaSubjects,
};
use crate::store::Store;

/// Page size of the asset detail store; it only ever holds one asset.
const DETAIL_LIMIT: usize = 1;

pub struct Dashboard {
    pub search: Store<AssetSearch>,
    pub asset: Store<AssetDetail>,
    pub featuresets: Store<Featuresets>,
    pub metricsets: Store<Metricsets>,
    pub connectors: Store<Connectors>,
    pub schemas: Store<SchemaSubjects>,
    backend: Backend,
}

impl Dashboard {
    pub fn new(config: &Config, fetcher: Arc<dyn Fetcher>, locator: ServiceLocator) -> Self {
        let backend = Backend::new(fetcher, Arc::new(locator));
        let paging = &config.paging;
        Self {
            search: Store::new(AssetSearch::new(backend.clone()), paging.search),
            asset: Store::new(AssetDetail::new(backend.clone()), DETAIL_LIMIT),
            featuresets: Store::new(Featuresets::new(backend.clone()), paging.featuresets),
            metricsets: Store::new(Metricsets::new(backend.clone()), paging.metricsets),
            connectors: Store::new(Connectors::new(backend.clone()), paging.connectors),
            schemas: Store::new(SchemaSubjects::new(backend.clone()), paging.schemas),
            backend,
        }
    }

    /// Build against the real services: HTTP fetcher, process environment
    /// and the `[services]` table of `config`.
    pub fn connect(config: &Config) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(&config.http)?;
        let locator = ServiceLocator::from_env().with_config(config);
        Ok(Self::new(config, Arc::new(fetcher), locator))
    }

    pub fn locator(&self) -> &ServiceLocator {
        self.backend.locator()
    }

    pub async fn restart_connector(&self, name: &str) -> Result<(), FetchError> {
        restart_connector(&self.backend, name).await
    }
}
