#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

pub const DEFAULT_API_ENDPOINT: &str = "https://randomuser.me/api/";
pub const DEFAULT_RESULTS: usize = 1000;
pub const MAX_RESULTS: usize = 5000;
pub const DEFAULT_GENDER: &str = "male";
pub const DEFAULT_NATIONALITY: &str = "fr";
pub const DEFAULT_FIELDS: &str = "dob,name,email";
/// Fields a record cannot be decoded without.
pub const REQUIRED_FIELDS: &[&str] = &["name", "dob"];
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_STATE_DIR: &str = "./.people-stats";
pub const DEFAULT_ORIGIN: &str = "http://localhost";

/// randomuser.me query string; empty values are left out.
pub(crate) fn build_query(
    results: usize,
    gender: &str,
    nationality: &str,
    fields: &str,
) -> Vec<(String, String)> {
    [
        ("results", results.to_string()),
        ("gender", gender.to_string()),
        ("nat", nationality.to_string()),
        ("inc", fields.to_string()),
    ]
    .into_iter()
    .filter(|(_, value)| !value.trim().is_empty())
    .map(|(key, value)| (key.to_string(), value))
    .collect()
}
