use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use tpmload_core::config::TpmloadConfig;
use tpmload_runner::cli::{Cli, Commands, ConfigAction, EndpointsArgs, OutputFormat, RunArgs};
use tpmload_runner::{logging, metrics_server, runner, summary};
use tpmload_scenario::{ScenarioBuilder, catalog_from_core};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Run(args) => run_command(&cli, args).await,
        Commands::Endpoints(args) => endpoints_command(&cli, args).await,
        Commands::Config(config_args) => config_command(&cli, &config_args.action).await,
    }
}

async fn run_command(cli: &Cli, args: &RunArgs) -> Result<()> {
    let mut config = TpmloadConfig::load(&cli.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config '{}': {}", cli.config.display(), e))?;

    // CLI 인자는 환경변수와 파일보다 우선합니다.
    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(vus) = args.vus {
        config.load.vus = vus;
    }
    if let Some(iterations) = args.iterations {
        config.load.iterations = iterations;
    }
    if let Some(duration) = args.duration {
        config.load.duration_secs = duration;
    }
    if let Some(pause) = args.pause {
        config.load.pause_secs = pause;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration after overrides: {}", e))?;

    logging::init_tracing(&config.general)?;

    let run_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(
        run_id = %run_id,
        target = %config.target.base_url,
        "tpmload starting"
    );

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
    }

    let scenario = Arc::new(
        ScenarioBuilder::from_config(&config)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build scenario: {}", e))?,
    );
    tracing::info!(
        enabled_endpoints = scenario.enabled_count(),
        "scenario initialized"
    );

    // ctrl-c → 우아한 종료
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received");
                cancel.cancel();
            }
        });
    }

    let started = Instant::now();
    let snapshot = runner::run(Arc::clone(&scenario), &config.load, cancel).await;

    summary::print_summary(&run_id, &snapshot, started.elapsed(), cli.output)?;
    Ok(())
}

async fn endpoints_command(cli: &Cli, args: &EndpointsArgs) -> Result<()> {
    let mut config = TpmloadConfig::from_file(&cli.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config '{}': {}", cli.config.display(), e))?;
    config.apply_env_overrides();

    let catalog = catalog_from_core(&config.scenario.endpoints);
    let visible: Vec<_> = catalog
        .iter()
        .filter(|e| args.all || e.enabled)
        .collect();

    match cli.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&visible)?);
        }
        OutputFormat::Text => {
            println!(
                "{:<36} {:<36} {:<9} {}",
                "Path", "Label", "Enabled", "Query"
            );
            println!("{}", "-".repeat(96));
            for endpoint in visible {
                let query = endpoint
                    .query
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join("&");
                println!(
                    "{:<36} {:<36} {:<9} {}",
                    endpoint.path, endpoint.label, endpoint.enabled, query
                );
            }
        }
    }
    Ok(())
}

async fn config_command(cli: &Cli, action: &ConfigAction) -> Result<()> {
    let mut config = TpmloadConfig::from_file(&cli.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config '{}': {}", cli.config.display(), e))?;
    config.apply_env_overrides();

    match action {
        ConfigAction::Validate => {
            config
                .validate()
                .map_err(|e| anyhow::anyhow!("configuration invalid: {}", e))?;
            println!("configuration is valid: {}", cli.config.display());
            Ok(())
        }
        ConfigAction::Show { section } => {
            // 토큰은 출력하지 않습니다.
            if !config.target.bearer_token.is_empty() {
                config.target.bearer_token = "<redacted>".to_owned();
            }
            let rendered = match section.as_deref() {
                None => toml::to_string_pretty(&config)?,
                Some("general") => toml::to_string_pretty(&config.general)?,
                Some("target") => toml::to_string_pretty(&config.target)?,
                Some("load") => toml::to_string_pretty(&config.load)?,
                Some("metrics") => toml::to_string_pretty(&config.metrics)?,
                Some("scenario") => toml::to_string_pretty(&config.scenario)?,
                Some(other) => {
                    return Err(anyhow::anyhow!(
                        "unknown section '{}', expected one of: general, target, load, metrics, scenario",
                        other
                    ));
                }
            };
            print!("{rendered}");
            Ok(())
        }
    }
}
