use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use booktrack_app::book::form::DateField;
use booktrack_app::library::models::Tab;
use booktrack_app::{BookDetailView, LibraryView, SearchView};
use booktrack_http::{HttpLibraryApi, LibraryApi};
use booktrack_kernel::models::Status;
use booktrack_kernel::settings::Settings;
use booktrack_kernel::{InitCtx, PageQuery, View};

#[derive(Parser)]
#[command(name = "booktrack", version, about = "Keep track of what you are reading")]
struct Cli {
    /// Backend base URL, overriding configuration
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search for books, optionally adding one of the results
    Search {
        query: String,
        /// Add result N (1-based) to the library
        #[arg(long)]
        add: Option<usize>,
        /// Initial status for the added book
        #[arg(long, default_value = "to_read")]
        status: Status,
    },
    /// List the library, filtered by status or `all`
    Library {
        #[arg(long, default_value = "to_read")]
        status: Tab,
    },
    /// Change the reading status of a library entry
    SetStatus { google_id: String, status: Status },
    /// Rate a library entry from 1 to 5 stars
    Rate {
        google_id: String,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
    },
    /// Remove a book from the library
    Remove { google_id: String },
    /// Show one library entry
    Show { google_id: String },
    /// Edit a library entry and save it
    Edit {
        google_id: String,
        #[arg(long)]
        status: Option<Status>,
        /// Start time as YYYY-MM-DDTHH:MM
        #[arg(long, conflicts_with = "clear_started")]
        started_at: Option<String>,
        /// Finish time as YYYY-MM-DDTHH:MM
        #[arg(long, conflicts_with = "clear_finished")]
        finished_at: Option<String>,
        #[arg(long)]
        clear_started: bool,
        #[arg(long)]
        clear_finished: bool,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: Option<u8>,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load BookTrack settings")?;
    if let Some(base_url) = cli.base_url {
        settings.api.base_url = base_url;
    }
    booktrack_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        api = %settings.api.base_url,
        "booktrack starting"
    );

    let api: Arc<dyn LibraryApi> = Arc::new(HttpLibraryApi::new(&settings.api)?);
    run(cli.command, api, &settings).await
}

async fn run(
    command: Command,
    api: Arc<dyn LibraryApi>,
    settings: &Settings,
) -> anyhow::Result<()> {
    let ui = settings.ui.clone();
    match command {
        Command::Search { query, add, status } => {
            let view = SearchView::new(api, ui);
            open(&view, settings, [("q", query.as_str())]).await?;

            if let Some(n) = add {
                let index = n.checked_sub(1).context("results are numbered from 1")?;
                if !view.select_status(index, status) {
                    bail!("no result number {n}");
                }
                let outcome = view.add(index).await;
                print!("{}", view.page());
                view.stop().await?;
                if let Some(outcome) = outcome {
                    println!("{}", outcome.label());
                }
            } else {
                print!("{}", view.page());
                view.stop().await?;
            }
        }
        Command::Library { status } => {
            let view = LibraryView::new(api, ui);
            open(&view, settings, [("status", tab_param(status))]).await?;
            print!("{}", view.page());
            view.stop().await?;
        }
        Command::SetStatus { google_id, status } => {
            let view = library(api, settings).await?;
            view.change_status(&google_id, status).await?;
            print!("{}", view.page());
            view.stop().await?;
        }
        Command::Rate { google_id, rating } => {
            let view = library(api, settings).await?;
            view.rate(&google_id, rating).await?;
            print!("{}", view.page());
            view.stop().await?;
        }
        Command::Remove { google_id } => {
            let view = library(api, settings).await?;
            view.remove(&google_id).await?;
            print!("{}", view.page());
            view.stop().await?;
        }
        Command::Show { google_id } => {
            let view = detail(api, settings, &google_id).await?;
            if let Some(page) = view.page() {
                print!("{page}");
            }
            view.stop().await?;
        }
        Command::Edit {
            google_id,
            status,
            started_at,
            finished_at,
            clear_started,
            clear_finished,
            rating,
            notes,
        } => {
            let view = detail(api, settings, &google_id).await?;
            view.edit(|form| {
                if let Some(status) = status {
                    form.status = status;
                }
                if let Some(value) = started_at.as_deref() {
                    form.set_date(DateField::StartedAt, value)?;
                }
                if clear_started {
                    form.set_date(DateField::StartedAt, "")?;
                }
                if let Some(value) = finished_at.as_deref() {
                    form.set_date(DateField::FinishedAt, value)?;
                }
                if clear_finished {
                    form.set_date(DateField::FinishedAt, "")?;
                }
                if let Some(rating) = rating {
                    form.click_star(rating)?;
                }
                if let Some(notes) = notes {
                    form.notes = notes;
                }
                Ok::<_, booktrack_app::book::form::FormError>(())
            })
            .context("entry is not loaded")??;

            view.submit().await?;
            if let Some(page) = view.page() {
                print!("{page}");
            }
            println!("saved");
            view.stop().await?;
        }
    }
    Ok(())
}

async fn open<const N: usize>(
    view: &dyn View,
    settings: &Settings,
    query: [(&str, &str); N],
) -> anyhow::Result<()> {
    let query = PageQuery::from_pairs(query);
    view.init(&InitCtx {
        settings,
        query: &query,
    })
    .await
    .with_context(|| format!("failed to open the {} page", view.name()))
}

async fn library(api: Arc<dyn LibraryApi>, settings: &Settings) -> anyhow::Result<LibraryView> {
    let view = LibraryView::new(api, settings.ui.clone());
    open(&view, settings, [("status", tab_param(Tab::All))]).await?;
    Ok(view)
}

async fn detail(
    api: Arc<dyn LibraryApi>,
    settings: &Settings,
    google_id: &str,
) -> anyhow::Result<BookDetailView> {
    let view = BookDetailView::new(api, settings.ui.clone());
    open(&view, settings, [("google_id", google_id)]).await?;
    if view.page().is_none() {
        bail!("no library entry for '{google_id}'");
    }
    Ok(view)
}

fn tab_param(tab: Tab) -> &'static str {
    match tab.status() {
        Some(status) => status.as_str(),
        None => "all",
    }
}
