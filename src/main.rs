// src/main.rs

use clap::Parser;
use color_eyre::eyre::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::stdout;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use vanguard_recon::config::Config;
use vanguard_recon::core::error::ScanError;
use vanguard_recon::core::models::{ErrorResponse, Profile, ScanRecord, ScanRequest, TargetKind};
use vanguard_recon::core::service::ScanService;
use vanguard_recon::core::target::host_from_input;
use vanguard_recon::logging;

mod app;
mod ui;

use app::{App, AppState};

type ScanOutcome = Result<ScanRecord, ScanError>;

/// Passive reconnaissance for domains and IPv4 addresses.
///
/// Without a target the interactive terminal UI starts. With a target one
/// scan runs and the record is printed as JSON.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Domain, IPv4 address or URL to scan.
    target: Option<String>,

    /// Override the automatic classification (domain, ip, unclassified).
    #[arg(long)]
    kind: Option<TargetKind>,

    /// Probe set to run (basic, deep).
    #[arg(long, default_value_t = Profile::Basic)]
    profile: Profile,

    /// Authorization token for the deep profile.
    #[arg(long, env = "VANGUARD_RECON_TOKEN")]
    token: Option<String>,

    /// Per-port connect timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Maximum concurrent port probes.
    #[arg(long)]
    concurrency: Option<usize>,

    /// How many of the common ports the deep profile scans.
    #[arg(long)]
    deep_ports: Option<usize>,

    /// Overall deadline for one request, in seconds.
    #[arg(long)]
    deadline_secs: Option<u64>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(ms) = self.timeout_ms {
            config.port_timeout = Duration::from_millis(ms);
        }
        if let Some(n) = self.concurrency {
            config.port_concurrency = n;
        }
        if let Some(n) = self.deep_ports {
            config.deep_port_count = n;
        }
        if let Some(secs) = self.deadline_secs {
            config.request_deadline = Duration::from_secs(secs);
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    logging::initialize_logging()?;

    let cli = Cli::parse();
    let mut config = Config::from_env();
    cli.apply_overrides(&mut config);
    let service = ScanService::from_config(&config)?;

    match cli.target.clone() {
        Some(target) => run_headless(&service, &cli, &target).await,
        None => {
            run_tui(&service, cli.token.clone()).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_headless(service: &ScanService, cli: &Cli, target: &str) -> Result<ExitCode> {
    let request = ScanRequest {
        target: host_from_input(target),
        kind: cli.kind,
        profile: cli.profile,
        authorization_token: cli.token.clone(),
    };
    info!(target = %request.target, profile = %request.profile, "Headless scan requested.");

    let outcome = service.handle(request).await;
    service.flush().await;

    match outcome {
        Ok(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{}", serde_json::to_string_pretty(&ErrorResponse::from(&e))?);
            Ok(if e.is_client_error() { ExitCode::from(2) } else { ExitCode::from(1) })
        }
    }
}

async fn run_tui(service: &ScanService, token: Option<String>) -> Result<()> {
    let outcome = restore_after(|| event_loop(service, token), restore_terminal);
    service.flush().await;
    outcome
}

fn event_loop(service: &ScanService, token: Option<String>) -> Result<()> {
    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let mut app = App::new(token);
    let (tx, mut rx) = mpsc::channel::<ScanOutcome>(1);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if event::poll(Duration::from_millis(100))? {
            handle_events(&mut app, service, &tx)?;
        }

        if let Ok(outcome) = rx.try_recv() {
            app.finish(outcome);
        }
        app.on_tick();
    }
    Ok(())
}

/// Runs `body`, then `restore` whatever the outcome. An error from `body`
/// takes precedence over one from `restore`.
fn restore_after<T>(body: impl FnOnce() -> Result<T>, restore: impl FnOnce() -> Result<()>) -> Result<T> {
    let outcome = body();
    let restored = restore();
    let value = outcome?;
    restored?;
    Ok(value)
}

fn restore_terminal() -> Result<()> {
    // --- Restore Terminal ---
    let screen = stdout().execute(LeaveAlternateScreen).map(drop);
    let mouse = stdout().execute(DisableMouseCapture).map(drop);
    disable_raw_mode()?;
    screen?;
    mouse?;
    Ok(())
}

fn handle_events(app: &mut App, service: &ScanService, tx: &mpsc::Sender<ScanOutcome>) -> Result<()> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            match app.state {
                AppState::Disclaimer => match key.code {
                    KeyCode::Enter => app.acknowledge_disclaimer(),
                    KeyCode::Char('q') => app.quit(),
                    _ => {}
                },
                AppState::Idle => handle_idle_input(app, key.code, service, tx),
                AppState::Finished => handle_finished_input(app, key.code),
                AppState::Scanning => {
                    if key.code == KeyCode::Char('q') { app.quit(); }
                }
            }
        }
    }
    Ok(())
}

fn handle_idle_input(app: &mut App, key_code: KeyCode, service: &ScanService, tx: &mpsc::Sender<ScanOutcome>) {
    match key_code {
        KeyCode::Esc => app.quit(),
        KeyCode::Tab => app.toggle_profile(),
        KeyCode::Char(c) => app.input.push(c),
        KeyCode::Backspace => { app.input.pop(); },
        KeyCode::Enter => {
            let Some(request) = app.start_scan() else { return; };
            let service = service.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = service.handle(request).await;
                let _ = tx.send(outcome).await;
            });
        }
        _ => {}
    }
}

fn handle_finished_input(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('n') => app.reset(),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        _ => {}
    }
}
