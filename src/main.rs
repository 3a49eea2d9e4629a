mod action;
mod app;
mod auth;
mod cloud;
mod config;
mod error;
mod event;
mod github;
mod tui;
mod types;
mod ui;

use std::panic;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::{Action, View};
use crate::app::App;
use crate::cloud::CloudClient;
use crate::config::Config;
use crate::event::Event;
use crate::github::GitHub;
use crate::tui::EventHandler;
use crate::ui::theme::Theme;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliView {
    Stacks,
    Issues,
}

#[derive(Debug, Parser)]
#[command(
    name = "stackdash",
    about = "Terminal dashboard for GitHub issues and infrastructure stacks"
)]
struct Cli {
    /// View to show at startup
    #[arg(long, value_enum)]
    view: Option<CliView>,

    /// Override the configured issue search query
    #[arg(long)]
    query: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let cli = Cli::parse();

    let mut config = Config::load();
    if let Some(query) = cli.query {
        config.github.query = query;
    }

    // An unresolvable home directory is fatal; a missing or bad token is
    // not, it surfaces in the affected pane instead.
    let credentials_path = auth::resolve_credentials_path(&config.cloud.credentials_file)?;

    let github_token = match auth::github_token() {
        Ok(token) => Some(token),
        Err(err) => {
            tracing::warn!("{}", err);
            None
        }
    };
    let github = GitHub::new(github_token)?;
    let cloud = CloudClient::new(config.cloud.api_url.clone());

    let view = match cli.view {
        Some(CliView::Stacks) => View::Stacks,
        Some(CliView::Issues) => View::Issues,
        None => match config.general.default_view.as_deref() {
            Some("issues") => View::Issues,
            _ => View::Stacks,
        },
    };

    // Run the application
    let result = run(view, config, github, cloud, credentials_path).await;

    // Restore terminal
    tui::restore()?;

    result
}

async fn run(
    view: View,
    config: Config,
    github: GitHub,
    cloud: CloudClient,
    credentials_path: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize terminal
    let mut terminal = tui::init()?;

    // Create action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    // Create app state
    let mut app = App::new(view, config, github, cloud, credentials_path, action_tx.clone());
    let theme = Theme::default();

    // Create event handler
    let tick_rate = Duration::from_millis(250);
    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(tick_rate, render_rate);

    // Main loop
    loop {
        // Handle events and actions
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app, &theme))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
