use std::fs;
use std::path::Path;

use sniper_core::api::{
    spawn_signal_listener, AppConfig, BrowserMode, CheckoutBot, CheckoutOutcome, CliError,
    MetricsSnapshot, SessionContext,
};
use sniper_plugins::factory::{build_actions, build_browser};

use crate::state::{self, BotState};

/// Run the bot until checkout completes, retries run out, or a stop arrives.
pub async fn start(cfg: AppConfig, url: String) -> Result<i32, CliError> {
    let dir = state::runtime_dir()?;
    if let Some(previous) = state::read_live_state(&dir)? {
        tracing::warn!(
            target: "sniper.cli",
            pid = previous.pid,
            session = %previous.session_id,
            "another bot is running, its state file will be replaced"
        );
    }
    let stop_file = state::stop_file(&dir);
    if stop_file.exists() {
        fs::remove_file(&stop_file)?;
    }

    let metrics_path = std::env::current_dir()?.join(&cfg.metrics.path);
    let headed = cfg.browser.mode == BrowserMode::Headed;
    let ctx = SessionContext::new(cfg);
    let shutdown = ctx.shutdown().clone();
    let listener = spawn_signal_listener(shutdown.clone(), Some(stop_file));

    let browser = match build_browser(ctx.cfg()).await {
        Ok(browser) => browser,
        Err(e) => {
            shutdown.shutdown("browser startup failed").await;
            return Err(e.into());
        }
    };
    shutdown.register_browser(browser.driver.clone());

    let bot_state = BotState {
        session_id: uuid::Uuid::new_v4().to_string(),
        pid: std::process::id(),
        url: url.clone(),
        metrics_path: metrics_path.display().to_string(),
        started_at: chrono::Local::now().to_rfc3339(),
    };
    match state::write_state(&dir, &bot_state) {
        Ok(path) => shutdown.register_temp_file(path),
        Err(e) => {
            shutdown.shutdown("state file unavailable").await;
            return Err(e);
        }
    }
    tracing::info!(
        target: "sniper.cli",
        session = %bot_state.session_id,
        pid = bot_state.pid,
        url = %url,
        "bot started"
    );

    let session = ctx.cancel_token();
    let actions = build_actions();
    let mut bot = CheckoutBot::new(&ctx, url, browser.driver, Some(browser.restart));
    let result = bot.run(actions.as_ref()).await;

    let (exit, hand_over) = match &result {
        Ok(CheckoutOutcome::Completed) => {
            println!("Checkout reached the payment page.");
            (0, true)
        }
        Ok(CheckoutOutcome::Cancelled) => (0, false),
        Ok(outcome) => {
            println!("Checkout did not complete: {}", outcome.as_str());
            (1, false)
        }
        Err(e) => (1, e.intervention().is_some()),
    };

    // The browser is left open for payment or manual repair until the user stops us.
    if hand_over && headed && !session.is_cancelled() {
        println!("Browser left open. Press Ctrl+C or run `sniper stop` to close it.");
        session.cancelled().await;
    }

    let reason = match &result {
        Ok(outcome) => outcome.as_str(),
        Err(_) => "run failed",
    };
    shutdown.shutdown(reason).await;
    if let Some(handle) = listener {
        if let Err(e) = handle.await {
            tracing::warn!(target: "sniper.cli", error = %e, "signal listener ended abnormally");
        }
    }

    result.map(|_| exit)
}

/// Print the running bot and its metrics; 0 when a bot is running.
pub fn status() -> Result<i32, CliError> {
    let dir = state::runtime_dir()?;
    let Some(bot_state) = state::read_live_state(&dir)? else {
        println!("sniper is not running");
        return Ok(1);
    };
    print_state(&bot_state);
    print_metrics(Path::new(&bot_state.metrics_path));
    Ok(0)
}

fn print_state(bot_state: &BotState) {
    println!("session:    {}", bot_state.session_id);
    println!("pid:        {}", bot_state.pid);
    println!("url:        {}", bot_state.url);
    println!("started at: {}", bot_state.started_at);
}

fn print_metrics(path: &Path) {
    match MetricsSnapshot::load_from_file(path) {
        Ok(snapshot) => {
            println!("state:      {}", snapshot.current_state);
            println!(
                "attempts:   {} ({} ok, {} failed)",
                snapshot.total_attempts, snapshot.successful_attempts, snapshot.failed_attempts
            );
            println!("success:    {:.1}%", snapshot.success_rate);
            println!("avg time:   {:.2}s", snapshot.average_response_time);
            for (kind, count) in &snapshot.error_counts {
                println!("error:      {kind} x{count}");
            }
        }
        Err(e) => println!("metrics unavailable: {e:#}"),
    }
}

/// Ask a running bot to stop, then run the local no-op shutdown.
pub async fn stop(cfg: AppConfig) -> Result<i32, CliError> {
    let dir = state::runtime_dir()?;
    match state::read_live_state(&dir)? {
        Some(bot_state) => {
            let path = state::request_stop(&dir)?;
            tracing::info!(target: "sniper.cli", pid = bot_state.pid, path = %path.display(), "stop requested");
            println!("Stop requested for pid {}", bot_state.pid);
        }
        None => println!("sniper is not running"),
    }

    let ctx = SessionContext::new(cfg);
    ctx.shutdown().stop().await;
    Ok(0)
}
