mod cli;
mod error_fmt;
mod run;
mod start;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;

use crate::cli::{Cli, Commands, DEFAULT_CONFIG, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{CONFIG_CONTEXT, exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("color-eyre: {e}");
    }

    let code = match real_main(&cli) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "exiting with error");
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            exit_code_for_error(&e)
        }
    };
    std::process::exit(code);
}

fn load_config(path: Option<&Path>) -> eyre::Result<setpoint_config::Config> {
    let (path, explicit) = match path {
        Some(p) => (p, true),
        None => (Path::new(DEFAULT_CONFIG), false),
    };
    if !explicit && !path.exists() {
        return Ok(setpoint_config::Config::default());
    }
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("{CONFIG_CONTEXT}: read {}", path.display()))?;
    let cfg = setpoint_config::load_toml(&text)
        .map_err(eyre::Report::new)
        .wrap_err_with(|| format!("{CONFIG_CONTEXT}: parse {}", path.display()))?;
    cfg.validate().wrap_err(CONFIG_CONTEXT)?;
    Ok(cfg)
}

fn init_tracing(json: bool, level: &str, logging: &setpoint_config::Logging) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let console_json = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let console_pretty = (!json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    let file_layer = logging.file.as_deref().map(|file| {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map_or_else(|| "setpoint.log".into(), |n| n.to_os_string());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        fmt::layer().json().with_ansi(false).with_writer(writer)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_json)
        .with(console_pretty)
        .with(file_layer)
        .try_init();
}

fn real_main(cli: &Cli) -> eyre::Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    let level = cli
        .log_level
        .as_deref()
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    init_tracing(cli.json, level, &cfg.logging);

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
            tracing::warn!(error = %e, "Ctrl-C handler not installed");
        }
    }

    match &cli.cmd {
        Commands::Pressure(args) => run::run_loop("pressure", &cfg.pressure, args, cli.json, &shutdown),
        Commands::Temperature(args) => {
            run::run_loop("temperature", &cfg.temperature, args, cli.json, &shutdown)
        }
        Commands::OptimalStart {
            history,
            zone_temp,
            outdoor_temp,
            occupied_setpoint,
            method,
            occupancy,
        } => start::run_optimal_start(
            &cfg.optimal_start,
            &start::StartRequest {
                history,
                zone_temp: *zone_temp,
                outdoor_temp: *outdoor_temp,
                occupied_setpoint: *occupied_setpoint,
                method: *method,
                occupancy: *occupancy,
            },
            cli.json,
        ),
        Commands::CheckConfig => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "ok",
                        "pressure_reset": cfg.pressure.reset.is_some(),
                        "temperature_reset": cfg.temperature.reset.is_some(),
                    })
                );
            } else {
                println!("config ok");
            }
            Ok(())
        }
    }
}
