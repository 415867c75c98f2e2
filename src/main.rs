use burger_stats::utils::summary::{print_duration, print_summary, print_usage_hint};
use burger_stats::utils::{logger, validation::Validate};
use burger_stats::{run_statistics, CliConfig};
use clap::error::ErrorKind;
use clap::Parser;
use std::time::Instant;

#[tokio::main]
async fn main() {
    let start_time = Instant::now();

    let config = match CliConfig::try_parse() {
        Ok(config) => config,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprintln!("Arguments Error: {}", e.to_string().trim_end());
            print_usage_hint();
            print_duration("", start_time.elapsed());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting burger-stats CLI");
    tracing::debug!("CLI config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        print_usage_hint();
        print_duration(&config.attribute, start_time.elapsed());
        std::process::exit(e.exit_code());
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let attribute = config.attribute.clone();
    let exit_code = match run_statistics(config, monitor_enabled).await {
        Ok(summary) => {
            tracing::info!("✅ Statistic run completed successfully!");
            print_summary(&summary);
            0
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Statistic run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            if e.is_fatal() {
                print_usage_hint();
            }
            e.exit_code()
        }
    };

    print_duration(&attribute, start_time.elapsed());

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}
