mod config;
mod logging;
mod posts;
mod storage;
mod tasks;
mod theme;
mod tui;

use anyhow::{bail, Context, Result};
use clap::{Command, CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{generate, Generator, Shell};
use config::{Config, ConfigError};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use posts::browser::ListingBrowser;
use posts::source::HttpPostSource;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use storage::{FileSlotStore, SlotStore};
use tasks::models::TaskFilter;
use tasks::store::TaskStore;
use theme::Theme;
use tracing::info;
use tui::{app::App, ui};

#[derive(Parser)]
#[command(name = "taskpad")]
#[command(about = "A terminal task list with a paginated post browser")]
struct Cli {
    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase log verbosity")]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Add a task")]
    Add {
        #[arg(required = true, help = "Task text")]
        text: Vec<String>,
    },
    #[command(about = "List tasks")]
    List {
        #[arg(short, long, value_enum, default_value_t = TaskFilter::All)]
        filter: TaskFilter,
    },
    #[command(about = "Toggle a task between active and completed")]
    Toggle {
        #[arg(help = "Task id")]
        id: i64,
    },
    #[command(about = "Delete a task")]
    Delete {
        #[arg(help = "Task id")]
        id: i64,
    },
    #[command(about = "Fetch posts and print one page")]
    Posts {
        #[arg(short, long, default_value = "", help = "Case-insensitive search over title and body")]
        search: String,
        #[arg(short, long, default_value_t = 1, help = "Page number (clamped to the available pages)")]
        page: usize,
    },
    #[command(about = "Show or change the light/dark theme")]
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
    #[command(about = "Configuration management")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ThemeAction {
    #[command(about = "Print the current theme")]
    Get,
    #[command(about = "Switch between light and dark")]
    Toggle,
    #[command(about = "Set the theme")]
    Set {
        #[arg(value_enum)]
        theme: Theme,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    #[command(about = "Set a configuration value")]
    Set {
        #[arg(help = "Configuration key (data_dir, posts_url, fetch_timeout_secs)")]
        key: String,
        #[arg(help = "Configuration value", value_hint = ValueHint::AnyPath)]
        value: String,
    },
    #[command(about = "Get a configuration value")]
    Get {
        #[arg(help = "Configuration key")]
        key: String,
    },
    #[command(about = "List all configuration values")]
    List,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Config { action }) => handle_config_command(action).map_err(anyhow::Error::from),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            print_completions(shell, &mut cmd);
            Ok(())
        }
        command => run_with_config(command, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn handle_config_command(action: ConfigAction) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, value)?;
            config.save()?;
            println!("Configuration saved successfully.");
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for key in config::KEYS {
                println!("{} = {}", key, config.get(key)?);
            }
        }
    }
    Ok(())
}

fn run_with_config(command: Option<Commands>, verbose: u8) -> Result<()> {
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    let data_dir = config.data_dir()?;
    let _log_guard = logging::init_tracing_or_warn(&data_dir, verbose);
    info!(data_dir = %data_dir.display(), "starting");

    let slots = FileSlotStore::new(&data_dir);

    match command {
        None => run_main_app(&config, slots),
        Some(Commands::Add { text }) => {
            let mut store = TaskStore::load(slots);
            if let Some(line) = add_command(&mut store, &text.join(" "))? {
                println!("{}", line);
            }
            Ok(())
        }
        Some(Commands::List { filter }) => {
            let store = TaskStore::load(slots);
            let visible = store.filtered_tasks(filter);
            if visible.is_empty() {
                println!("No tasks found");
            }
            for task in visible {
                let checkbox = if task.completed { "[x]" } else { "[ ]" };
                println!("{} {} {}", task.id, checkbox, task.text);
            }
            println!();
            println!("{} tasks remaining", store.remaining());
            println!("Total tasks: {}", store.total());
            Ok(())
        }
        Some(Commands::Toggle { id }) => {
            let mut store = TaskStore::load(slots);
            println!("{}", toggle_command(&mut store, id)?);
            Ok(())
        }
        Some(Commands::Delete { id }) => {
            let mut store = TaskStore::load(slots);
            println!("{}", delete_command(&mut store, id)?);
            Ok(())
        }
        Some(Commands::Posts { search, page }) => print_posts(&config, &search, page),
        Some(Commands::Theme { action }) => {
            let mut slots = slots;
            let current = Theme::load(&slots);
            let theme = match action {
                None | Some(ThemeAction::Get) => current,
                Some(ThemeAction::Toggle) => current.toggled(),
                Some(ThemeAction::Set { theme }) => theme,
            };
            if theme != current {
                theme.save(&mut slots).context("Failed to save theme")?;
            }
            println!("{}", theme);
            Ok(())
        }
        Some(Commands::Config { .. }) | Some(Commands::Completion { .. }) => Ok(()),
    }
}

// Blank text is ignored without output, like the add box in the UI.
fn add_command<S: SlotStore>(store: &mut TaskStore<S>, text: &str) -> Result<Option<String>> {
    if !store.add_task(text) {
        return Ok(None);
    }
    check_saved(store)?;
    Ok(store
        .tasks()
        .last()
        .map(|task| format!("Added task {}: {}", task.id, task.text)))
}

fn toggle_command<S: SlotStore>(store: &mut TaskStore<S>, id: i64) -> Result<String> {
    if !store.toggle_task(id) {
        bail!("No task with id {}", id);
    }
    check_saved(store)?;
    Ok(format!("Toggled task {}", id))
}

fn delete_command<S: SlotStore>(store: &mut TaskStore<S>, id: i64) -> Result<String> {
    if !store.delete_task(id) {
        bail!("No task with id {}", id);
    }
    check_saved(store)?;
    Ok(format!("Deleted task {}", id))
}

fn check_saved<S: SlotStore>(store: &mut TaskStore<S>) -> Result<()> {
    match store.take_save_error() {
        Some(e) => Err(anyhow::Error::new(e).context("Failed to save tasks")),
        None => Ok(()),
    }
}

fn print_posts(config: &Config, search: &str, page: usize) -> Result<()> {
    let source = HttpPostSource::new(config.posts_url.clone(), config.fetch_timeout())?;
    let mut browser = ListingBrowser::new();
    browser.fetch_all(&source);

    if let Some(message) = &browser.state().error_message {
        bail!("{}", message);
    }

    browser.search(search);
    browser.set_page(page);

    let visible = browser.visible_page();
    if visible.is_empty() {
        println!("No posts found");
    }
    for post in visible {
        println!("#{} {}", post.id, post.title);
        println!("    {}", post.body.replace('\n', "\n    "));
        println!();
    }
    if browser.show_pager() {
        println!("Page {} of {}", browser.state().current_page, browser.total_pages());
    }
    Ok(())
}

fn run_main_app(config: &Config, slots: FileSlotStore) -> Result<()> {
    let source = HttpPostSource::new(config.posts_url.clone(), config.fetch_timeout())?;
    let prefs = slots.clone();
    let tasks = TaskStore::load(slots);
    let mut app = App::new(tasks, prefs, Arc::new(source));

    run_tui(&mut app)
}

fn run_tui(app: &mut App<FileSlotStore>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App<FileSlotStore>) -> Result<()> {
    loop {
        app.drain_fetch_results();
        terminal.draw(|f| ui::draw(f, app))?;

        // Poll so finished fetches get drawn without waiting for a key.
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key_event(key)?;
                }
                if app.should_quit {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn print_completions<G: Generator>(generator: G, cmd: &mut Command) {
    generate(generator, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemorySlotStore;

    #[test]
    fn test_add_blank_text_is_silent() {
        let mut store = TaskStore::load(MemorySlotStore::new());

        assert_eq!(add_command(&mut store, "   ").unwrap(), None);
        assert_eq!(add_command(&mut store, "").unwrap(), None);
        assert_eq!(store.total(), 0);
        assert_eq!(store.slots().writes, 0);
    }

    #[test]
    fn test_add_writes_slot_once() {
        let mut store = TaskStore::load(MemorySlotStore::new());

        let line = add_command(&mut store, "buy milk").unwrap().unwrap();

        assert!(line.ends_with(": buy milk"));
        assert_eq!(store.slots().writes, 1);
    }

    #[test]
    fn test_add_reports_failed_write() {
        let mut store = TaskStore::load(MemorySlotStore::failing());

        let err = add_command(&mut store, "buy milk").unwrap_err();

        assert!(format!("{:#}", err).starts_with("Failed to save tasks"));
        assert_eq!(store.total(), 1);
    }

    #[test]
    fn test_toggle_and_delete_write_slot_once_each() {
        let mut store = TaskStore::load(MemorySlotStore::new());
        add_command(&mut store, "a").unwrap();
        let id = store.tasks()[0].id;

        assert_eq!(toggle_command(&mut store, id).unwrap(), format!("Toggled task {}", id));
        assert_eq!(store.slots().writes, 2);
        assert_eq!(delete_command(&mut store, id).unwrap(), format!("Deleted task {}", id));
        assert_eq!(store.slots().writes, 3);
    }

    #[test]
    fn test_unknown_id_is_an_error_without_write() {
        let mut store = TaskStore::load(MemorySlotStore::new());

        assert!(toggle_command(&mut store, 7).is_err());
        assert!(delete_command(&mut store, 7).is_err());
        assert_eq!(store.slots().writes, 0);
    }
}
