use clap::Parser;
use player_age_etl::domain::ports::ConfigProvider;
use player_age_etl::utils::{logger, validation::Validate};
use player_age_etl::{AgeHistogramPipeline, EtlEngine, LocalStorage, ReportFormat, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-histogram")]
#[command(about = "Player age histogram driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "etl-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override output format from config
    #[arg(long, value_enum)]
    format: Option<ReportFormat>,

    /// Show what would be processed without running the pipeline
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // Logger is not up yet; report config errors on stderr.
    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    logger::init_cli_logger_with_level(args.verbose, config.log_level());

    tracing::info!("🚀 Starting TOML-based age histogram");
    tracing::info!("✅ Configuration loaded from {} and validated", args.config);

    if let Some(format) = args.format {
        config.output.format = Some(format);
        tracing::info!("🔧 Output format overridden to: {:?}", format);
    }

    eprint!("{}", config_summary(&config, args.dry_run));

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.base_dir().to_string());
    let pipeline = AgeHistogramPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(report) => {
            tracing::info!("✅ Age histogram computed");
            println!("{}", report);
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

/// Human-readable configuration overview, printed to stderr so stdout holds only the report.
fn config_summary(config: &TomlConfig, dry_run: bool) -> String {
    let mut lines = vec![
        "📋 Configuration Summary:".to_string(),
        format!(
            "  Pipeline: {} v{}",
            config.pipeline.name, config.pipeline.version
        ),
    ];
    if let Some(description) = &config.pipeline.description {
        lines.push(format!("  Description: {}", description));
    }
    lines.push(format!("  Input: {}/{}", config.base_dir(), config.input_path()));
    lines.push(format!("  Headers: {}", config.has_headers()));
    lines.push(format!("  Delimiter: {:?}", config.delimiter() as char));
    if !config.has_headers() {
        lines.push(format!("  Age column: {}", config.age_column()));
    }
    lines.push(match config.mapper_concurrency() {
        Some(n) => format!("  Mapper concurrency: {}", n),
        None => "  Mapper concurrency: one task per record".to_string(),
    });
    lines.push(format!("  Output format: {:?}", config.output_format()));
    if let Some(level) = config.log_level() {
        lines.push(format!("  Log level: {}", level));
    }

    if dry_run {
        lines.push("  🔍 DRY RUN MODE ENABLED".to_string());
    }

    lines.join("\n") + "\n\n"
}
