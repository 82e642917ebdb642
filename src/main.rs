mod app;
mod cli;
mod config;
mod dispatch;
mod input;
mod k8s;
mod labels;
mod model;
mod navigation;
mod panels;
mod query;
mod resolver;
mod selection;
mod ui;

use anyhow::{Context, Result};
use app::{App, AppCommand};
use clap::Parser;
use cli::CliArgs;
use config::Settings;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use dispatch::DetailDispatcher;
use futures::StreamExt;
use k8s::KubeGateway;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::Path;
use std::sync::Mutex;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let settings = Settings::load(&args)?;
    init_tracing(&args.log_filter, settings.log_file.as_deref())?;
    if let Some(source) = &settings.source {
        info!("loaded config from {source}");
    }

    let gateway = KubeGateway::new(args.context.clone()).await?;
    let mut app = App::new(
        gateway.cluster().to_string(),
        gateway.context().to_string(),
        DetailDispatcher::new(settings.logs_tail),
    );
    if let Some(namespace) = &args.namespace {
        app.preselect_namespace(namespace);
    }

    run(&mut app, &gateway, settings.refresh_ms).await
}

fn init_tracing(level_filter: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .compact();

    let _ = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(io::sink).try_init(),
    };

    Ok(())
}

async fn run(app: &mut App, gateway: &KubeGateway, refresh_ms: u64) -> Result<()> {
    let mut terminal = init_terminal()?;
    let run_result = run_loop(&mut terminal, app, gateway, refresh_ms).await;
    let restore_result = restore_terminal(&mut terminal);

    match (run_result, restore_result) {
        (Err(run_error), Err(restore_error)) => Err(anyhow::anyhow!(
            "{run_error:#}\nterminal restore error: {restore_error:#}"
        )),
        (Err(error), _) => Err(error),
        (_, Err(error)) => Err(error),
        (Ok(()), Ok(())) => Ok(()),
    }
}

fn init_terminal() -> Result<TuiTerminal> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().context("failed to clear terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut TuiTerminal) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )
    .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

async fn run_loop(
    terminal: &mut TuiTerminal,
    app: &mut App,
    gateway: &KubeGateway,
    refresh_ms: u64,
) -> Result<()> {
    app.set_status("Loading cluster data...");
    terminal
        .draw(|frame| ui::render(frame, app))
        .context("failed to render terminal frame")?;
    app.execute(AppCommand::RefreshAll, gateway).await;
    app.set_status("Ready");

    let mut reader = EventStream::new();
    let mut ticker = interval(Duration::from_millis(refresh_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately and the data is already fresh.
    ticker.tick().await;

    loop {
        terminal
            .draw(|frame| ui::render(frame, app))
            .context("failed to render terminal frame")?;

        if !app.running() {
            break;
        }

        tokio::select! {
            maybe_event = reader.next() => {
                let action = match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        input::map_key(app.mode(), key)
                    }
                    Some(Ok(Event::Mouse(mouse))) => input::map_mouse(mouse),
                    Some(Ok(_)) => None,
                    Some(Err(error)) => {
                        app.set_status(format!("terminal event error: {error}"));
                        None
                    }
                    None => {
                        app.set_status("terminal event stream closed");
                        break;
                    }
                };
                if let Some(action) = action {
                    debug!("action={action:?}");
                    let command = app.apply_action(action);
                    if command != AppCommand::None {
                        terminal
                            .draw(|frame| ui::render(frame, app))
                            .context("failed to render terminal frame")?;
                        app.execute(command, gateway).await;
                    }
                }
            }
            _ = ticker.tick() => {
                app.on_tick(gateway).await;
            }
        }
    }

    Ok(())
}
