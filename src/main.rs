//! FAQ Chat Terminal Host
//!
//! Mounts the chat widget on stdin/stdout and forwards questions to the
//! configured answer service.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::io::{BufRead, IsTerminal};
use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use faq_chat_widget::client::{HEALTH_CHECK_TIMEOUT, HttpAnswerClient};
use faq_chat_widget::config::{AppConfig, LogFormat};
use faq_chat_widget::runtime::{UiEvent, WidgetHandle, WidgetRuntime};
use faq_chat_widget::terminal::TerminalView;
use faq_chat_widget::widget::Widget;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before config so FAQ_CHAT__* vars apply
    let _ = dotenv();

    let config = AppConfig::load().context("Configuration error")?;
    init_tracing(config.logging.format);

    let client = HttpAnswerClient::from_config(&config.endpoint)
        .context("Invalid answer service endpoint")?;

    info!(
        name: "faq.config.loaded",
        endpoint = %client.endpoint(),
        timeout_secs = ?config.endpoint.timeout_secs,
        "Answer service configured"
    );

    // Health probe runs in the background; chatting does not wait on it
    let client = Arc::new(client);
    tokio::spawn(report_health(Arc::clone(&client)));

    let stdout = std::io::stdout();
    let ansi = stdout.is_terminal();
    let widget = Widget::mount(TerminalView::new(stdout, ansi), config.widget);
    if !widget.is_live() {
        anyhow::bail!("chat widget could not be mounted");
    }

    let (runtime, handle) = WidgetRuntime::new(widget, client);
    spawn_input_reader(handle);

    runtime.run().await;
    Ok(())
}

/// Log the answer service's health once.
async fn report_health(client: Arc<HttpAnswerClient>) {
    match client.health_within(HEALTH_CHECK_TIMEOUT).await {
        Ok(status) if status.is_healthy() => {
            info!(name: "faq.health.ok", "Answer service is healthy");
        }
        Ok(status) => {
            warn!(name: "faq.health.degraded", status = %status.status, "Answer service reports degraded health");
        }
        Err(e) => {
            warn!(name: "faq.health.failed", error = %e, "Answer service health check failed");
        }
    }
}

/// Initialize tracing on stderr so it does not interleave with the chat (M-LOG-STRUCTURED).
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

/// Read stdin on a dedicated thread and translate lines into widget events.
///
/// `/open` and `/close` stand in for the launcher and close control; any
/// other line is typed into the input and sent with Enter.
fn spawn_input_reader(handle: WidgetHandle) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let event = match line.trim() {
                "/open" => UiEvent::LauncherClicked,
                "/close" => UiEvent::CloseClicked,
                "/quit" => break,
                _ => UiEvent::EnterPressed(line.clone()),
            };
            if !handle.send(event) {
                break;
            }
        }
        handle.shutdown();
    });
}
