use crate::core::{AgeReport, Pipeline};
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: String,
    pub report: AgeReport,
}

pub struct ReportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ReportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Fetch, aggregate and store one report; returns where it was written.
    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting age report...");

        tracing::info!("Fetching person records...");
        let records = self.pipeline.extract().await?;
        tracing::info!("Fetched {} records", records.len());

        tracing::info!("Aggregating records...");
        let report = self.pipeline.transform(records).await?;
        tracing::info!(
            "Aggregated {} records into {} bands, {} ranked",
            report.record_count,
            report.histogram.counts().len(),
            report.oldest.len()
        );

        tracing::info!("Saving report...");
        let output_path = self.pipeline.load(report.clone()).await?;
        tracing::info!("Report saved to: {}", output_path);

        Ok(RunSummary {
            output_path,
            report,
        })
    }
}
