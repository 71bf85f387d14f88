pub mod aggregator;
pub mod etl;
pub mod pipeline;
pub mod reload_counter;

pub use crate::domain::model::{AgeReport, PersonRecord};
pub use crate::domain::ports::{ConfigProvider, KeyValueStore, Pipeline, ReloadSignal, Storage};
pub use crate::utils::error::Result;
