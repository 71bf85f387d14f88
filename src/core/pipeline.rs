use crate::core::aggregator::{bucketize, decode_records, top_oldest};
use crate::core::{AgeReport, ConfigProvider, Pipeline, PersonRecord, Storage};
use crate::domain::model::AgeHistogram;
use crate::utils::error::{ReportError, Result};
use reqwest::Client;
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_ARCHIVE: &str = "age_report.zip";

/// Reload state attached to `report.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReloadSnapshot {
    pub count: u64,
    pub alternate_style: Option<String>,
}

#[derive(Serialize)]
struct HistogramBar {
    label: &'static str,
    count: u64,
}

#[derive(Serialize)]
struct RankedRow {
    name: String,
    age: i64,
    date_of_birth: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    generated_at: String,
    record_count: usize,
    histogram: Vec<HistogramBar>,
    oldest: Vec<RankedRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reload: Option<&'a ReloadSnapshot>,
}

pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
    reload: Option<ReloadSnapshot>,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
            reload: None,
        }
    }

    pub fn with_reload(mut self, snapshot: ReloadSnapshot) -> Self {
        self.reload = Some(snapshot);
        self
    }
}

fn histogram_csv(histogram: &AgeHistogram) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["band", "count"])?;
    for (label, count) in histogram.labelled() {
        writer.write_record([label.to_string(), count.to_string()])?;
    }
    into_csv_string(writer)
}

fn oldest_csv(oldest: &[PersonRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["name", "age", "date_of_birth"])?;
    for record in oldest {
        writer.write_record([
            record.display_name(),
            record.age().to_string(),
            record.formatted_birth_date(),
        ])?;
    }
    into_csv_string(writer)
}

fn into_csv_string(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| {
        ReportError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<PersonRecord>> {
        let endpoint = self.config.api_endpoint();
        let params = self.config.query_parameters();
        tracing::debug!("Making API request to: {} with {:?}", endpoint, params);

        let response = self.client.get(endpoint).query(&params).send().await?;
        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(ReportError::ApiStatusError {
                endpoint: endpoint.to_string(),
                status: response.status().as_u16(),
            });
        }

        let mut body: serde_json::Value = response.json().await?;
        let results = body.get_mut("results").map(serde_json::Value::take);
        let items = match results {
            Some(serde_json::Value::Array(items)) => items,
            other => {
                // randomuser 錯誤回應: {"error": "..."}
                let reason = match body.get("error").and_then(|e| e.as_str()) {
                    Some(message) => format!("API error: {}", message),
                    None if other.is_some() => "'results' is not an array".to_string(),
                    None => "missing 'results' array".to_string(),
                };
                return Err(ReportError::PayloadError {
                    endpoint: endpoint.to_string(),
                    reason,
                });
            }
        };

        if items.is_empty() {
            tracing::warn!("API returned no person records");
        }

        let records = decode_records(items)?;
        tracing::debug!("Decoded {} person records", records.len());
        Ok(records)
    }

    async fn transform(&self, records: Vec<PersonRecord>) -> Result<AgeReport> {
        let histogram = bucketize(&records)?;
        let oldest = top_oldest(&records, self.config.top_n())?;

        tracing::debug!(
            "Histogram {:?}, {} records ranked",
            histogram.counts(),
            oldest.len()
        );

        Ok(AgeReport {
            record_count: records.len(),
            histogram_csv: histogram_csv(&histogram)?,
            oldest_csv: oldest_csv(&oldest)?,
            histogram,
            oldest,
        })
    }

    async fn load(&self, report: AgeReport) -> Result<String> {
        let output_path = format!("{}/{}", self.config.output_path(), REPORT_ARCHIVE);

        let document = ReportDocument {
            generated_at: chrono::Utc::now().to_rfc3339(),
            record_count: report.record_count,
            histogram: report
                .histogram
                .labelled()
                .map(|(label, count)| HistogramBar { label, count })
                .collect(),
            oldest: report
                .oldest
                .iter()
                .map(|record| RankedRow {
                    name: record.display_name(),
                    age: record.age(),
                    date_of_birth: record.formatted_birth_date(),
                    email: record.email.clone(),
                })
                .collect(),
            reload: self.reload.as_ref(),
        };

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>("histogram.csv", FileOptions::default())?;
            zip.write_all(report.histogram_csv.as_bytes())?;

            zip.start_file::<_, ()>("oldest.csv", FileOptions::default())?;
            zip.write_all(report.oldest_csv.as_bytes())?;

            zip.start_file::<_, ()>("report.json", FileOptions::default())?;
            zip.write_all(serde_json::to_string_pretty(&document)?.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(REPORT_ARCHIVE, &zip_data).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Dob, Name};
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct TestConfig {
        endpoint: String,
        top_n: i64,
    }

    impl ConfigProvider for TestConfig {
        fn api_endpoint(&self) -> &str {
            &self.endpoint
        }

        fn query_parameters(&self) -> Vec<(String, String)> {
            vec![("results".to_string(), "5".to_string())]
        }

        fn output_path(&self) -> &str {
            "./test-output"
        }

        fn top_n(&self) -> i64 {
            self.top_n
        }

        fn state_dir(&self) -> &str {
            "./test-state"
        }

        fn origin(&self) -> &str {
            "http://localhost"
        }
    }

    fn config(endpoint: String) -> TestConfig {
        TestConfig { endpoint, top_n: 10 }
    }

    fn person(first: &str, age: i64) -> serde_json::Value {
        serde_json::json!({
            "name": {"title": "Mr", "first": first, "last": "Bernard"},
            "email": format!("{}@example.com", first.to_lowercase()),
            "dob": {"date": "1960-05-17T08:00:00.000Z", "age": age}
        })
    }

    #[tokio::test]
    async fn test_extract_reads_results_array() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/").query_param("results", "5");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "results": [person("Jules", 25), person("Marc", 72)],
                    "info": {"seed": "abc", "results": 2}
                }));
        });

        let pipeline = ReportPipeline::new(MockStorage::new(), config(server.url("/api/")));
        let records = pipeline.extract().await.unwrap();

        api_mock.assert();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name.first, "Marc");
        assert_eq!(records[1].age(), 72);
    }

    #[tokio::test]
    async fn test_extract_surfaces_http_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/");
            then.status(503);
        });

        let pipeline = ReportPipeline::new(MockStorage::new(), config(server.url("/api/")));
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, ReportError::ApiStatusError { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_extract_rejects_malformed_age() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/");
            then.status(200).json_body(serde_json::json!({
                "results": [person("Jules", 25), {
                    "name": {"title": "Mr", "first": "X", "last": "Y"},
                    "dob": {"date": "1960-05-17T08:00:00.000Z", "age": null}
                }]
            }));
        });

        let pipeline = ReportPipeline::new(MockStorage::new(), config(server.url("/api/")));
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, ReportError::AggregationError(_)));
    }

    #[tokio::test]
    async fn test_extract_rejects_payload_without_results_array() {
        let cases = [
            (
                serde_json::json!({"error": "Uh oh, something has gone wrong."}),
                "Uh oh",
            ),
            (serde_json::json!({"results": "x"}), "not an array"),
            (serde_json::json!([person("Jules", 25)]), "missing"),
        ];

        for (body, expected) in cases {
            let server = MockServer::start();
            server.mock(|when, then| {
                when.method(GET).path("/api/");
                then.status(200).json_body(body);
            });

            let pipeline = ReportPipeline::new(MockStorage::new(), config(server.url("/api/")));
            match pipeline.extract().await {
                Err(ReportError::PayloadError { reason, .. }) => {
                    assert!(reason.contains(expected), "reason: {}", reason)
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_extract_accepts_empty_results() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/");
            then.status(200)
                .json_body(serde_json::json!({"results": [], "info": {"results": 0}}));
        });

        let pipeline = ReportPipeline::new(MockStorage::new(), config(server.url("/api/")));
        assert!(pipeline.extract().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transform_builds_histogram_and_ranking() {
        let records: Vec<PersonRecord> = [25, 72, 41, 72, 18]
            .iter()
            .enumerate()
            .map(|(i, age)| PersonRecord {
                name: Name {
                    title: "Mr".to_string(),
                    first: format!("P{}", i),
                    last: "Petit".to_string(),
                },
                dob: Dob {
                    date: "1952-02-29T00:00:00.000Z".to_string(),
                    age: *age,
                },
                email: None,
            })
            .collect();

        let pipeline = ReportPipeline::new(
            MockStorage::new(),
            TestConfig {
                endpoint: "http://unused".to_string(),
                top_n: 3,
            },
        );
        let report = pipeline.transform(records).await.unwrap();

        assert_eq!(report.histogram.counts(), [2, 0, 1, 0, 0, 2]);
        assert_eq!(report.oldest.len(), 3);
        assert_eq!(report.oldest[0].name.first, "P1");
        assert_eq!(report.oldest[1].name.first, "P3");
        assert!(report.histogram_csv.starts_with("band,count\n<30,2\n"));
        assert!(report.oldest_csv.contains("Mr. P1 Petit,72,29.02.1952"));
    }

    #[tokio::test]
    async fn test_transform_rejects_negative_top_n() {
        let pipeline = ReportPipeline::new(
            MockStorage::new(),
            TestConfig {
                endpoint: "http://unused".to_string(),
                top_n: -1,
            },
        );
        let err = pipeline.transform(Vec::new()).await.unwrap_err();
        assert!(matches!(err, ReportError::AggregationError(_)));
    }

    #[tokio::test]
    async fn test_load_writes_archive_with_reload_state() {
        let storage = MockStorage::new();
        let pipeline = ReportPipeline::new(storage.clone(), config("http://unused".to_string()))
            .with_reload(ReloadSnapshot {
                count: 5,
                alternate_style: Some("greyBg".to_string()),
            });

        let report = pipeline.transform(Vec::new()).await.unwrap();
        let path = pipeline.load(report).await.unwrap();
        assert_eq!(path, "./test-output/age_report.zip");

        let data = storage.get_file(REPORT_ARCHIVE).await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
        assert_eq!(archive.len(), 3);

        let mut json = String::new();
        archive
            .by_name("report.json")
            .unwrap()
            .read_to_string(&mut json)
            .unwrap();
        let document: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(document["record_count"], 0);
        assert_eq!(document["histogram"].as_array().unwrap().len(), 6);
        assert_eq!(document["histogram"][5]["label"], "70+");
        assert_eq!(document["reload"]["count"], 5);
        assert_eq!(document["reload"]["alternate_style"], "greyBg");
    }
}
