pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{FileKeyValueStore, LocalStorage, MemoryKeyValueStore};
pub use core::aggregator::{bucketize, top_oldest, DEFAULT_TOP_N};
pub use core::etl::{ReportEngine, RunSummary};
pub use core::pipeline::{ReloadSnapshot, ReportPipeline};
pub use core::reload_counter::{ReloadCounter, ReloadOutcome};
pub use domain::model::{AgeBand, AgeHistogram, Dob, Name, PersonRecord};
pub use domain::ports::NavigationType;
pub use utils::error::{AggregationError, PersistenceError, ReportError, Result};
