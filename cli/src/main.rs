use clap::Parser;
use sniper_cli::commands::{cli, run};
use sniper_core::api::{load_with_overrides, AppConfig, CliError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let cfg = load_with_overrides(args.config.as_deref(), &args.overrides())?;
    init_tracing(&cfg).map_err(CliError::Command)?;
    tracing::debug!(
        target: "sniper.cli",
        base_interval = cfg.retry.base_interval,
        max_retries = cfg.retry.max_retries,
        mode = cfg.browser.mode.as_str(),
        "configuration loaded"
    );

    match args.command {
        cli::Commands::Start => {
            let url = args.start_url()?;
            run::start(cfg, url).await
        }
        cli::Commands::Status => run::status(),
        cli::Commands::Stop => run::stop(cfg).await,
    }
}

fn exit_code_for_error(e: &CliError) -> i32 {
    if e.intervention().is_some() {
        tracing::error!(target: "sniper.cli", "run ended waiting for user intervention");
    }
    1
}

fn init_tracing(cfg: &AppConfig) -> Result<(), String> {
    let logging = &cfg.logging;
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(cfg.effective_log_level()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("sniper"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("sniper.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    // Debug runs get human-readable output; otherwise one JSON object per line.
    let console_layer = logging.console.then(|| {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr));
        if cfg.debug {
            layer.pretty().boxed()
        } else {
            layer.json().boxed()
        }
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
