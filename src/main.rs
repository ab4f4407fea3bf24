//! hh-console: terminal front end for the HH auto-apply backend.
//!
//! Every command runs one console operation against an in-memory page and
//! prints the resulting notification, followed by the rendered fragment
//! when the operation produced one.

use anyhow::Context;
use clap::{Parser, Subcommand};
use hh_console::api::{Backend, HttpBackend};
use hh_console::auth::bus::MessageBus;
use hh_console::auth::callback::CallbackServer;
use hh_console::auth::popup::SystemBrowser;
use hh_console::auth::{AuthCoordinator, AuthSettings};
use hh_console::config::AppConfig;
use hh_console::console::{AssumeYes, Confirm, Console};
use hh_console::constants::{
    HISTORY_BODY_SELECTOR, MESSAGE_BUS_CAPACITY, NOTIFICATION_TEXT_SELECTOR, PROFILES_GRID_ID,
    PROFILE_BAD_WORDS_FIELD, PROFILE_CLIENT_ID_FIELD, PROFILE_CLIENT_SECRET_FIELD,
    PROFILE_COVER_LETTER_FIELD, PROFILE_DESCRIPTION_FIELD, PROFILE_NAME_FIELD,
    PROFILE_REDIRECT_URI_FIELD, PROFILE_RESUME_FIELD, SEARCH_INPUT_ID, VACANCIES_GRID_ID,
};
use hh_console::dom::{lock, Document};
use hh_console::logging;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "hh-console", author, version, about)]
struct Cli {
    /// Config file (defaults to the per-user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides the config file
    #[arg(long, global = true, env = "HH_CONSOLE_BACKEND")]
    backend: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the backend is up
    Health,
    /// List profiles
    Profiles,
    /// Create a profile
    Create(CreateArgs),
    /// Make a profile the active one
    Activate { id: i64 },
    /// Delete a profile
    Delete { id: i64 },
    /// Authorize a profile with HH in the browser
    Authorize { id: i64 },
    /// Search vacancies
    Search { query: String },
    /// Apply to one vacancy
    Apply { vacancy_id: String },
    /// Start automatic applications for a search query
    ApplyAll { query: String },
    /// Show application history
    History,
}

#[derive(clap::Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    client_id: String,
    #[arg(long)]
    client_secret: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    resume_id: String,
    #[arg(long, default_value = "")]
    bad_words: String,
    /// Defaults to the backend's callback page
    #[arg(long)]
    redirect_uri: Option<String>,
    #[arg(long, default_value = "")]
    cover_letter: String,
}

/// Asks on the terminal; anything but "y"/"yes"/"д"/"да" declines.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, message: &str) -> bool {
        print!("{} [y/N] ", message);
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(
            answer.trim().to_lowercase().as_str(),
            "y" | "yes" | "д" | "да"
        )
    }
}

fn print_notification(console: &Console) {
    let doc = lock(console.document());
    if let Some(text) = doc.get(NOTIFICATION_TEXT_SELECTOR).map(|e| e.text.as_str()) {
        if !text.is_empty() {
            println!("{}", text);
        }
    }
}

fn print_fragment(console: &Console, key: &str) {
    let doc = lock(console.document());
    if let Some(html) = doc.inner_html(key).filter(|html| !html.is_empty()) {
        println!("{}", html);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if let Some(backend) = &cli.backend {
        config.backend_url = backend.clone();
    }
    tracing::debug!("Using backend {}", config.backend_url);

    let backend: Arc<dyn Backend> = Arc::new(
        HttpBackend::new(&config.backend_url, config.request_timeout())
            .context("invalid backend URL")?,
    );

    let bus = MessageBus::new(MESSAGE_BUS_CAPACITY);
    let mut settings = AuthSettings::from_config(&config);
    if matches!(cli.command, Commands::Authorize { .. }) {
        let server = CallbackServer::bind(&config.callback_addr, bus.clone())
            .await
            .with_context(|| format!("cannot listen on {}", config.callback_addr))?;
        let origin = server.origin().to_string();
        if !settings.trusted_origins.contains(&origin) {
            settings.trusted_origins.push(origin.clone());
        }
        println!("Redirect URI for native authorization: {}", server.redirect_uri());
        server.spawn();
    }

    let auth = Arc::new(AuthCoordinator::new(
        Arc::clone(&backend),
        Arc::new(SystemBrowser),
        bus,
        settings,
    ));
    let confirm: Arc<dyn Confirm> = if cli.yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(StdinConfirm)
    };
    let console = Console::new(
        &config,
        Document::console_layout().into_shared(),
        Arc::clone(&backend),
        auth,
        confirm,
    );

    match cli.command {
        Commands::Health => {
            let health = backend.health().await.context("backend health check failed")?;
            println!("{}: {}", config.backend_base(), health.status);
        }
        Commands::Profiles => {
            console.init("/profiles").await;
            print_notification(&console);
            print_fragment(&console, PROFILES_GRID_ID);
        }
        Commands::Create(args) => {
            {
                let mut doc = lock(console.document());
                doc.set_value(PROFILE_NAME_FIELD, &args.name);
                doc.set_value(PROFILE_DESCRIPTION_FIELD, &args.description);
                doc.set_value(PROFILE_RESUME_FIELD, &args.resume_id);
                doc.set_value(PROFILE_BAD_WORDS_FIELD, &args.bad_words);
                doc.set_value(PROFILE_CLIENT_ID_FIELD, &args.client_id);
                doc.set_value(PROFILE_CLIENT_SECRET_FIELD, &args.client_secret);
                doc.set_value(
                    PROFILE_REDIRECT_URI_FIELD,
                    &args
                        .redirect_uri
                        .unwrap_or_else(|| config.default_redirect_uri()),
                );
                doc.set_value(PROFILE_COVER_LETTER_FIELD, &args.cover_letter);
            }
            console.create_profile().await;
            print_notification(&console);
        }
        Commands::Activate { id } => {
            console.activate_profile(id).await;
            print_notification(&console);
        }
        Commands::Delete { id } => {
            console.delete_profile(id).await;
            print_notification(&console);
        }
        Commands::Authorize { id } => {
            if let Some(task) = console.authorize_profile(id).await {
                println!("Complete the authorization in the browser window...");
                tokio::select! {
                    result = task => result.context("authorization task failed")?,
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Interrupted");
                        console.teardown();
                    }
                }
            }
            print_notification(&console);
        }
        Commands::Search { query } => {
            lock(console.document()).set_value(SEARCH_INPUT_ID, &query);
            console.search_key("Enter").await;
            print_notification(&console);
            print_fragment(&console, VACANCIES_GRID_ID);
        }
        Commands::Apply { vacancy_id } => {
            console.apply_to_vacancy(&vacancy_id).await;
            print_notification(&console);
        }
        Commands::ApplyAll { query } => {
            lock(console.document()).set_value(SEARCH_INPUT_ID, &query);
            console.auto_apply_to_all().await;
            print_notification(&console);
        }
        Commands::History => {
            console.init("/history").await;
            print_notification(&console);
            print_fragment(&console, HISTORY_BODY_SELECTOR);
        }
    }

    Ok(())
}
