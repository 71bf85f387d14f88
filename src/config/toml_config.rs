use crate::config::{
    build_query, DEFAULT_FIELDS, DEFAULT_GENDER, DEFAULT_NATIONALITY, DEFAULT_ORIGIN,
    DEFAULT_RESULTS, DEFAULT_STATE_DIR, MAX_RESULTS, REQUIRED_FIELDS,
};
use crate::core::aggregator::DEFAULT_TOP_N;
use crate::core::ConfigProvider;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{
    validate_contains_all, validate_path, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub state: StateConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: String,
    pub results: Option<usize>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub fields: Option<Vec<String>>,
    /// Extra query parameters, e.g. `seed`.
    pub parameters: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    pub top_n: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateConfig {
    pub dir: Option<String>,
    pub origin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_ENDPOINT})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            ReportError::ConfigValidationError {
                field: "environment".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn results(&self) -> usize {
        self.source.results.unwrap_or(DEFAULT_RESULTS)
    }

    fn fields(&self) -> String {
        self.source
            .fields
            .as_ref()
            .map(|fields| fields.join(","))
            .unwrap_or_else(|| DEFAULT_FIELDS.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn query_parameters(&self) -> Vec<(String, String)> {
        let mut query = build_query(
            self.results(),
            self.source.gender.as_deref().unwrap_or(DEFAULT_GENDER),
            self.source.nationality.as_deref().unwrap_or(DEFAULT_NATIONALITY),
            &self.fields(),
        );
        if let Some(parameters) = &self.source.parameters {
            query.extend(parameters.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        query
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn top_n(&self) -> i64 {
        self.report.top_n.unwrap_or(DEFAULT_TOP_N)
    }

    fn state_dir(&self) -> &str {
        self.state.dir.as_deref().unwrap_or(DEFAULT_STATE_DIR)
    }

    fn origin(&self) -> &str {
        self.state.origin.as_deref().unwrap_or(DEFAULT_ORIGIN)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_url("source.endpoint", &self.source.endpoint)?;
        validate_range("source.results", self.results(), 1, MAX_RESULTS)?;
        validate_range("report.top_n", self.top_n(), 0, MAX_RESULTS as i64)?;
        validate_path("load.output_path", &self.load.output_path)?;
        validate_path("state.dir", self.state_dir())?;
        validate_url("state.origin", self.origin())?;
        validate_contains_all("source.fields", &self.fields(), REQUIRED_FIELDS)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[source]
endpoint = "https://randomuser.me/api/"

[load]
output_path = "./output"
"#;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.results(), 1000);
        assert_eq!(config.top_n(), 10);
        assert_eq!(config.state_dir(), DEFAULT_STATE_DIR);
        assert_eq!(config.origin(), DEFAULT_ORIGIN);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[source]
endpoint = "https://randomuser.me/api/"
results = 50
gender = "female"
nationality = "de"
fields = ["name", "dob"]

[source.parameters]
seed = "demo"

[report]
top_n = 5

[state]
dir = "/tmp/people-stats"
origin = "https://demo.example.com"

[load]
output_path = "./reports"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.top_n(), 5);
        assert_eq!(config.origin(), "https://demo.example.com");
        assert_eq!(
            config.query_parameters(),
            vec![
                ("results".to_string(), "50".to_string()),
                ("gender".to_string(), "female".to_string()),
                ("nat".to_string(), "de".to_string()),
                ("inc".to_string(), "name,dob".to_string()),
                ("seed".to_string(), "demo".to_string()),
            ]
        );
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PEOPLE_STATS_TEST_ENDPOINT", "https://test.api.com");

        let toml_content = r#"
[source]
endpoint = "${PEOPLE_STATS_TEST_ENDPOINT}"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.endpoint, "https://test.api.com");

        std::env::remove_var("PEOPLE_STATS_TEST_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let invalid_url = MINIMAL.replace("https://randomuser.me/api/", "invalid-url");
        let config = TomlConfig::from_toml_str(&invalid_url).unwrap();
        assert!(config.validate().is_err());

        let negative_top_n = format!("{}\n[report]\ntop_n = -1\n", MINIMAL);
        let config = TomlConfig::from_toml_str(&negative_top_n).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output_path(), "./output");
    }

    #[test]
    fn test_missing_source_is_a_parse_error() {
        let err = TomlConfig::from_toml_str("[load]\noutput_path = \"x\"\n").unwrap_err();
        assert!(matches!(err, ReportError::ConfigValidationError { .. }));
    }
}
