//! Composition root: builds the cache, data-source chain, and dispatcher from
//! configuration.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use kanazawa_core::cache::{CacheStore, MemoryCacheStore, SurrealCacheStore};
use kanazawa_core::opendata::{OpenDataClient, OpenDataError};
use kanazawa_core::sources::DataSourceChain;
use kanazawa_core::store::SurrealTownStore;
use kanazawa_core::tools::{ToolDispatcher, ToolRegistry};
use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use tracing::{info, warn};

use crate::config::{DbCredentials, KanazawaConfig};

#[derive(Debug)]
pub enum WiringError {
    OpenData(OpenDataError),
    Cache(Box<surrealdb::Error>),
}

impl fmt::Display for WiringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenData(err) => write!(f, "failed to build open data client: {err}"),
            Self::Cache(err) => write!(f, "failed to connect cache store: {err}"),
        }
    }
}

impl Error for WiringError {}

pub async fn build_dispatcher(config: &KanazawaConfig) -> Result<ToolDispatcher, WiringError> {
    let cache = build_cache(config).await?;
    let chain = build_chain(config).await?;
    Ok(ToolDispatcher::new(
        Arc::new(ToolRegistry::new()),
        cache,
        Arc::new(chain),
    ))
}

async fn build_cache(config: &KanazawaConfig) -> Result<Arc<dyn CacheStore>, WiringError> {
    if let Some(uri) = config.cache_uri.as_deref() {
        let db = connect(
            uri,
            config.db_credentials.as_ref(),
            &config.db_namespace,
            &config.db_name,
        )
        .await
        .map_err(|err| WiringError::Cache(Box::new(err)))?;
        info!(uri, "using shared SurrealDB cache");
        return Ok(Arc::new(SurrealCacheStore::new(db)));
    }

    let cache = MemoryCacheStore::new();
    let _sweeper = cache.clone().spawn_sweeper(config.cache_sweep_interval);
    info!(
        sweep_secs = config.cache_sweep_interval.as_secs(),
        "using in-process cache"
    );
    Ok(Arc::new(cache))
}

async fn build_chain(config: &KanazawaConfig) -> Result<DataSourceChain, WiringError> {
    let mut chain = DataSourceChain::new();

    if config.use_open_data {
        let client =
            OpenDataClient::new(config.open_data_base_url.clone()).map_err(WiringError::OpenData)?;
        info!(base_url = client.base_url(), "open data tier enabled");
        chain = chain.with_open_data(Arc::new(client));
    }

    if config.db_enabled {
        match connect(
            &config.db_uri,
            config.db_credentials.as_ref(),
            &config.db_namespace,
            &config.db_name,
        )
        .await
        {
            Ok(db) => {
                info!(uri = %config.db_uri, "local store tier enabled");
                chain = chain.with_local_store(Arc::new(SurrealTownStore::new(db)));
            }
            Err(err) => {
                warn!(uri = %config.db_uri, error = %err, "local store unreachable; tier disabled");
            }
        }
    }

    Ok(chain)
}

async fn connect(
    uri: &str,
    credentials: Option<&DbCredentials>,
    namespace: &str,
    db_name: &str,
) -> Result<Surreal<Any>, surrealdb::Error> {
    let db = any::connect(uri).await?;
    if let Some(credentials) = credentials {
        db.signin(Root {
            username: credentials.username.as_str(),
            password: credentials.password.as_str(),
        })
        .await?;
    }
    db.use_ns(namespace).use_db(db_name).await?;
    Ok(db)
}
