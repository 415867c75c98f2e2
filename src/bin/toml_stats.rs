use burger_stats::core::scanner;
use burger_stats::core::ConfigProvider;
use burger_stats::utils::summary::{print_duration, print_summary, print_usage_hint};
use burger_stats::utils::{logger, validation::Validate};
use burger_stats::{run_statistics, TomlConfig};
use clap::Parser;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "toml-stats")]
#[command(about = "Order statistics with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "burger-stats.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the attribute from config
    #[arg(long)]
    attribute: Option<String>,

    /// Dry run - show which files would be processed without counting
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let start_time = Instant::now();
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based statistic tool");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            print_usage_hint();
            print_duration(args.attribute.as_deref().unwrap_or(""), start_time.elapsed());
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(attribute) = &args.attribute {
        config.input.attribute = attribute.clone();
        tracing::info!("🔧 Attribute overridden to: {}", attribute);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        print_usage_hint();
        print_duration(&config.input.attribute, start_time.elapsed());
        std::process::exit(e.exit_code());
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        let code = perform_dry_run(&config);
        std::process::exit(code);
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let attribute = config.input.attribute.clone();
    let exit_code = match run_statistics(config, monitor_enabled).await {
        Ok(summary) => {
            tracing::info!("✅ Statistic run completed successfully!");
            print_summary(&summary);
            0
        }
        Err(e) => {
            tracing::error!(
                "❌ Statistic run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            e.exit_code()
        }
    };

    print_duration(&attribute, start_time.elapsed());

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Input: {}", config.input_directory().display());
    println!("  Attribute: {}", config.attribute());
    println!("  Report: {} ({})", config.report_directory(), config.report.format);
    match config.max_workers() {
        Some(workers) => println!("  Max Workers: {}", workers),
        None => println!("  Max Workers: unbounded"),
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) -> i32 {
    println!("🔍 Dry Run Analysis:");

    match scanner::scan(config.input_directory()) {
        Ok(files) if files.is_empty() => {
            println!("  No json files found, a real run would fail");
            1
        }
        Ok(files) => {
            println!("  {} json files would be processed:", files.len());
            for file in &files {
                println!("    {}", file.display());
            }
            0
        }
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            e.exit_code()
        }
    }
}
