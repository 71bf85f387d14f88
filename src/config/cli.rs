use crate::config::{
    build_query, DEFAULT_API_ENDPOINT, DEFAULT_FIELDS, DEFAULT_GENDER, DEFAULT_NATIONALITY,
    DEFAULT_ORIGIN, DEFAULT_OUTPUT_PATH, DEFAULT_RESULTS, DEFAULT_STATE_DIR, MAX_RESULTS,
    REQUIRED_FIELDS,
};
use crate::core::ConfigProvider;
use crate::domain::ports::NavigationType;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_contains_all, validate_path, validate_range, validate_url, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "people-stats")]
#[command(about = "Age histogram and oldest-people ranking over random user records")]
pub struct CliConfig {
    /// Path to a TOML configuration file; replaces the source/report/state flags
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, default_value = DEFAULT_API_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, default_value_t = DEFAULT_RESULTS)]
    pub results: usize,

    #[arg(long, default_value = DEFAULT_GENDER)]
    pub gender: String,

    #[arg(long, default_value = DEFAULT_NATIONALITY)]
    pub nationality: String,

    /// Comma separated `inc` fields
    #[arg(long, default_value = DEFAULT_FIELDS)]
    pub fields: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output_path: String,

    /// Number of oldest people in the ranking
    #[arg(long, default_value_t = 10, allow_hyphen_values = true)]
    pub top_n: i64,

    #[arg(long, default_value = DEFAULT_STATE_DIR)]
    pub state_dir: String,

    #[arg(long, default_value = DEFAULT_ORIGIN)]
    pub origin: String,

    /// How this run was started; `reload` advances the reload counter
    #[arg(long, value_enum, default_value_t = NavigationType::Navigate)]
    pub navigation: NavigationType,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn query_parameters(&self) -> Vec<(String, String)> {
        build_query(self.results, &self.gender, &self.nationality, &self.fields)
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn top_n(&self) -> i64 {
        self.top_n
    }

    fn state_dir(&self) -> &str {
        &self.state_dir
    }

    fn origin(&self) -> &str {
        &self.origin
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_endpoint", &self.api_endpoint)?;
        validate_range("results", self.results, 1, MAX_RESULTS)?;
        validate_range("top_n", self.top_n, 0, MAX_RESULTS as i64)?;
        validate_path("output_path", &self.output_path)?;
        validate_path("state_dir", &self.state_dir)?;
        validate_url("origin", &self.origin)?;
        validate_contains_all("fields", &self.fields, REQUIRED_FIELDS)?;
        Ok(())
    }
}
