use clap::Parser;
use people_stats::core::ConfigProvider;
use people_stats::utils::error::ErrorSeverity;
use people_stats::utils::{logger, validation::Validate};
use people_stats::{
    CliConfig, FileKeyValueStore, LocalStorage, NavigationType, ReloadCounter, ReloadSnapshot,
    ReportEngine, ReportPipeline, RunSummary, TomlConfig,
};

const BAR_WIDTH: u64 = 40;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting people-stats");
    tracing::debug!("CLI config: {:?}", cli);

    let navigation = cli.navigation;
    let outcome = match cli.config.clone() {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(&path) {
                Ok(config) => run(config, navigation).await,
                Err(e) => Err(e),
            }
        }
        None => run(cli, navigation).await,
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Report failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run<C>(config: C, navigation: NavigationType) -> people_stats::Result<()>
where
    C: ConfigProvider + Validate + 'static,
{
    config.validate()?;

    let store = FileKeyValueStore::for_origin(config.state_dir(), config.origin())?;
    let mut counter = ReloadCounter::start(&store, &navigation);
    let alternate_style = counter.decide();
    tracing::info!(
        "🔄 Reload count {} ({:?}), alternate style: {}",
        counter.current_reload_count(),
        counter.outcome(),
        alternate_style
    );

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ReportPipeline::new(storage, config).with_reload(ReloadSnapshot {
        count: counter.current_reload_count(),
        alternate_style: counter.alternate_style_class().map(str::to_string),
    });

    let summary = ReportEngine::new(pipeline).run().await?;
    print_summary(&summary, &counter);
    Ok(())
}

fn print_summary(summary: &RunSummary, counter: &ReloadCounter) {
    let report = &summary.report;
    let widest = report.histogram.counts().into_iter().max().unwrap_or(0).max(1);

    println!("📊 Age of {} people:", report.record_count);
    for (label, count) in report.histogram.labelled() {
        let bar = "#".repeat((count * BAR_WIDTH / widest) as usize);
        println!("  {:>6} | {:<width$} {}", label, bar, count, width = BAR_WIDTH as usize);
    }

    println!();
    println!("👴 {} oldest:", report.oldest.len());
    println!("  {:<32} {:>4}  Date of birth", "Name", "Age");
    for record in &report.oldest {
        println!(
            "  {:<32} {:>4}  {}",
            record.display_name(),
            record.age(),
            record.formatted_birth_date()
        );
    }

    println!();
    match counter.alternate_style_class() {
        Some(class) => println!(
            "🎨 Reload #{}: footer style '{}'",
            counter.current_reload_count(),
            class
        ),
        None => println!("🎨 Reload #{}: default footer", counter.current_reload_count()),
    }
    println!("📁 Output saved to: {}", summary.output_path);
}
