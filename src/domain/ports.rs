use crate::domain::model::{AgeReport, PersonRecord};
use crate::utils::error::{PersistenceError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Origin-scoped string store that survives between runs.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> std::result::Result<Option<String>, PersistenceError>;
    /// Upsert.
    fn set_item(&self, key: &str, value: &str) -> std::result::Result<(), PersistenceError>;
}

/// Tells whether the current load re-requested the same page.
pub trait ReloadSignal {
    fn is_reload(&self) -> bool;
}

impl ReloadSignal for bool {
    fn is_reload(&self) -> bool {
        *self
    }
}

/// Navigation timing entry types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum NavigationType {
    #[default]
    Navigate,
    Reload,
    BackForward,
    Prerender,
}

impl ReloadSignal for NavigationType {
    fn is_reload(&self) -> bool {
        matches!(self, NavigationType::Reload)
    }
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn query_parameters(&self) -> Vec<(String, String)>;
    fn output_path(&self) -> &str;
    fn top_n(&self) -> i64;
    /// Directory holding the durable key-value files.
    fn state_dir(&self) -> &str;
    /// Origin the durable store is scoped to.
    fn origin(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<PersonRecord>>;
    async fn transform(&self, records: Vec<PersonRecord>) -> Result<AgeReport>;
    async fn load(&self, report: AgeReport) -> Result<String>;
}
