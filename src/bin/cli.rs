//! Lecture Board CLI
//!
//! Local entry point: print either list, browse both interactively, or
//! regenerate the materials index.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lecture_board::{
    error::{AppError, Result},
    models::{
        Announcement, Config, DisplayRecord, FilterField, ListingUpdate, ListingView, Material,
        MaterialAction, Tone,
    },
    pipeline::{self, Listable},
    services::{
        Board, DismissTrigger, InputEvent, ListingController, ListingSettings, LoadState,
        PageEvent, source_for,
    },
    utils::console,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Lecture Board - course materials and announcements
#[derive(Parser, Debug)]
#[command(
    name = "lecture-board",
    version,
    about = "Searchable listing of course materials and announcements"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "lecture-board.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List course materials
    Materials {
        /// Case-insensitive search phrase
        #[arg(short, long)]
        query: Option<String>,

        /// Material type (e.g. PDF)
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// Year
        #[arg(short, long)]
        year: Option<String>,

        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },

    /// List announcements
    Announcements {
        /// Case-insensitive search phrase
        #[arg(short, long)]
        query: Option<String>,

        /// Tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Include expired announcements
        #[arg(long)]
        show_expired: bool,

        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse both lists interactively (commands on stdin)
    Browse,

    /// Regenerate the materials index from the lectures directory
    Index {
        /// Site root containing the lectures directory
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = if cli.config.exists() {
        Some(Config::load(&cli.config))
    } else {
        None
    };
    let level = match &loaded {
        Some(Ok(config)) => config.logging.level.clone(),
        _ => "info".to_string(),
    };
    init_logging(cli.verbose, &level);

    let config = match loaded {
        Some(Ok(config)) => {
            log::info!("Loaded configuration from {}", cli.config.display());
            config
        }
        Some(Err(e)) => {
            log::warn!("Failed to load {}: {}. Using defaults.", cli.config.display(), e);
            Config::default()
        }
        None => {
            log::debug!("No config at {}, using defaults", cli.config.display());
            Config::default()
        }
    };

    match cli.command {
        Command::Materials {
            query,
            kind,
            year,
            json,
        } => {
            let mut events = Vec::new();
            events.extend(query.map(InputEvent::Query));
            events.extend(kind.map(|v| InputEvent::Filter(FilterField::Type, v)));
            events.extend(year.map(|v| InputEvent::Filter(FilterField::Year, v)));
            show_list::<Material>(&config, events, json).await?;
        }

        Command::Announcements {
            query,
            tag,
            show_expired,
            json,
        } => {
            let mut events = vec![InputEvent::ShowExpired(show_expired)];
            events.extend(query.map(InputEvent::Query));
            events.extend(tag.map(|v| InputEvent::Filter(FilterField::Tag, v)));
            show_list::<Announcement>(&config, events, json).await?;
        }

        Command::Browse => browse(&config).await?,

        Command::Index { root } => {
            log::info!("Indexing {}", root.join(&config.publish.lectures_dir).display());
            let summary = pipeline::publish(&root, &config.publish).await?;
            console::success(&format!(
                "Wrote {} ({} items)",
                summary.output.display(),
                summary.item_count
            ));
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }
    }

    Ok(())
}

/// Load one list with the given filters applied and print the result.
async fn show_list<T: Listable>(config: &Config, events: Vec<InputEvent>, json: bool) -> Result<()> {
    let (tx, mut updates) = mpsc::unbounded_channel();
    let mut controller = ListingController::<T>::new(
        source_for(&config.source)?,
        ListingSettings::from_config(config, T::KIND)?,
        tx,
    )?;

    // Before the first load these only set the filter state
    for event in events {
        controller.handle(event).await;
    }
    let state = controller.load().await;
    drop(controller);

    let mut view = None;
    while let Some(update) = updates.recv().await {
        match update {
            ListingUpdate::Ready(ready) => view = Some(ready),
            other if !json => print_update(&other, config.listing.chip_limit),
            _ => {}
        }
    }

    if state == LoadState::Failed {
        return Err(AppError::validation(format!("{} could not be loaded", T::KIND)));
    }
    if let Some(view) = view {
        if json {
            println!("{}", serde_json::to_string_pretty(&view)?);
        } else {
            print_view(&view, config.listing.chip_limit);
        }
    }
    Ok(())
}

/// Interactive session: page events are read line by line from stdin.
async fn browse(config: &Config) -> Result<()> {
    let (tx, mut updates) = mpsc::unbounded_channel();
    let board = Board::from_config(config, tx)?;
    let (events, inbox) = mpsc::unbounded_channel();

    let mut overlay = board.watch_overlay();
    let page = tokio::spawn(board.run(inbox));
    let previews = tokio::spawn(async move {
        while overlay.changed().await.is_ok() {
            match overlay.borrow_and_update().as_ref() {
                Some(session) => console::status(&format!(
                    "Preview: {} ({})",
                    session.title, session.resource_url
                )),
                None => console::status("Preview closed"),
            }
        }
    });
    let chip_limit = config.listing.chip_limit;
    let printer = tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            print_update(&update, chip_limit);
        }
    });

    console::header("Lecture Board");
    for line in HELP {
        console::sub_item(line);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Some(BrowseInput::Quit) => break,
            Some(BrowseInput::Event(event)) => {
                if events.send(event).is_err() {
                    break;
                }
            }
            None if line.trim().is_empty() => {}
            None => console::failure(&format!("Unknown command: {}", line.trim())),
        }
    }

    drop(events);
    if let Err(e) = page.await {
        log::error!("Board task failed: {}", e);
    }
    for (name, task) in [("Printer", printer), ("Preview", previews)] {
        if let Err(e) = task.await {
            log::error!("{} task failed: {}", name, e);
        }
    }
    Ok(())
}

const HELP: &[&str] = &[
    "q <text>        search materials",
    "type <T>        material type filter (empty clears)",
    "year <Y>        material year filter (empty clears)",
    "aq <text>       search announcements",
    "tag <T>         announcement tag filter (empty clears)",
    "expired on|off  show expired announcements",
    "reset | areset  reset material / announcement filters",
    "reload | areload",
    "open <n>        preview the n-th material",
    "close | esc     close the preview",
    "quit",
];

#[derive(Debug, PartialEq, Eq)]
enum BrowseInput {
    Event(PageEvent),
    Quit,
}

fn parse_command(line: &str) -> Option<BrowseInput> {
    let line = line.trim();
    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim().to_string()),
        None => (line, String::new()),
    };

    let materials = |event| Some(BrowseInput::Event(PageEvent::Materials(event)));
    let announcements = |event| Some(BrowseInput::Event(PageEvent::Announcements(event)));

    match command {
        "q" => materials(InputEvent::Query(arg)),
        "type" => materials(InputEvent::Filter(FilterField::Type, arg)),
        "year" => materials(InputEvent::Filter(FilterField::Year, arg)),
        "reset" => materials(InputEvent::Reset),
        "reload" => materials(InputEvent::Reload),
        "aq" => announcements(InputEvent::Query(arg)),
        "tag" => announcements(InputEvent::Filter(FilterField::Tag, arg)),
        "expired" => match arg.as_str() {
            "on" => announcements(InputEvent::ShowExpired(true)),
            "off" => announcements(InputEvent::ShowExpired(false)),
            _ => None,
        },
        "areset" => announcements(InputEvent::Reset),
        "areload" => announcements(InputEvent::Reload),
        "open" => {
            let n: usize = arg.parse().ok()?;
            let n = n.checked_sub(1)?;
            Some(BrowseInput::Event(PageEvent::OpenPreview(n)))
        }
        "close" => Some(BrowseInput::Event(PageEvent::Dismiss(
            DismissTrigger::CloseButton,
        ))),
        "esc" => Some(BrowseInput::Event(PageEvent::Dismiss(DismissTrigger::Escape))),
        "quit" | "exit" => Some(BrowseInput::Quit),
        _ => None,
    }
}

fn print_update(update: &ListingUpdate, chip_limit: usize) {
    match update {
        ListingUpdate::Loading { .. } => {}
        ListingUpdate::Ready(view) => print_view(view, chip_limit),
        ListingUpdate::Failed {
            kind,
            url,
            message,
            hints,
        } => {
            console::failure(&format!("{}: {}", kind, message));
            console::sub_item(&format!("URL: {}", url));
            for hint in hints {
                console::sub_item(hint);
            }
        }
        ListingUpdate::Status { tone, text, .. } => match tone {
            Tone::Neutral => console::status(text),
            Tone::Ok => console::success(text),
            Tone::Bad => console::failure(text),
        },
    }
}

fn print_view(view: &ListingView, chip_limit: usize) {
    console::header(&format!("{} ({}/{})", view.kind, view.shown, view.total));

    for (position, record) in view.records.iter().enumerate() {
        match record {
            DisplayRecord::Material(m) => {
                let when = m.date.as_deref().or(m.year.as_deref()).unwrap_or("");
                let kind = m.type_label.as_deref().unwrap_or("");
                console::sub_item(&format!("{:>3}. [{}] {} {}", position + 1, kind, m.title, when));
                if !m.description.is_empty() {
                    console::sub_item(&format!("       {}", m.description));
                }
                match &m.action {
                    MaterialAction::Unavailable => console::sub_item("       (no file)"),
                    MaterialAction::Download { href } => {
                        console::sub_item(&format!("       download: {}", href))
                    }
                    MaterialAction::Preview { href, .. } => {
                        console::sub_item(&format!("       preview/download: {}", href))
                    }
                }
            }
            DisplayRecord::Announcement(a) => {
                let badge = if a.important { "! " } else { "" };
                let date = a.date.as_deref().unwrap_or("");
                console::sub_item(&format!("{:>3}. {}{} {}", position + 1, badge, a.title, date));
                for line in &a.body_lines {
                    console::sub_item(&format!("       {}", line));
                }
                if let Some(expires) = &a.expires {
                    console::sub_item(&format!("       expires: {}", expires));
                }
            }
        }
    }

    if let Some(notice) = &view.notice {
        console::sub_item(notice);
    }

    let chips = view.facets.type_chips(chip_limit);
    let mut items = vec![("rendered", view.rendered_at.clone())];
    if let Some(generated) = &view.generated_at {
        items.push(("generated", generated.clone()));
    }
    if !chips.is_empty() {
        items.push(("types", chips.join(", ")));
    }
    if !view.facets.years.is_empty() {
        items.push(("years", view.facets.years.join(", ")));
    }
    if !view.facets.tags.is_empty() {
        items.push(("tags", view.facets.tags.join(", ")));
    }
    console::summary(&format!("{} shown of {}", view.shown, view.total), &items);
    console::separator();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_commands() {
        assert_eq!(
            parse_command("type  pdf "),
            Some(BrowseInput::Event(PageEvent::Materials(InputEvent::Filter(
                FilterField::Type,
                "pdf".into()
            ))))
        );
        assert_eq!(
            parse_command("year"),
            Some(BrowseInput::Event(PageEvent::Materials(InputEvent::Filter(
                FilterField::Year,
                String::new()
            ))))
        );
        assert_eq!(
            parse_command("expired on"),
            Some(BrowseInput::Event(PageEvent::Announcements(
                InputEvent::ShowExpired(true)
            )))
        );
    }

    #[test]
    fn test_parse_open_is_one_based() {
        assert_eq!(
            parse_command("open 1"),
            Some(BrowseInput::Event(PageEvent::OpenPreview(0)))
        );
        assert_eq!(parse_command("open 0"), None);
        assert_eq!(parse_command("open x"), None);
    }

    #[test]
    fn test_parse_unknown_and_quit() {
        assert_eq!(parse_command("quit"), Some(BrowseInput::Quit));
        assert_eq!(parse_command("expired maybe"), None);
        assert_eq!(parse_command("dance"), None);
    }
}
