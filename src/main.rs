use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
    time::Duration,
};

use trailtime::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    export::export_to_path,
    format::format_duration,
    kv::FileKvStore,
    logging,
    record::{Category, TimerRecord},
    runtime::{CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    stats::aggregate,
    store::RecordStore,
    ui,
};

const IDLE_POLL_MS: u64 = 250;

/// stopwatch tui for timing route runs
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Time your runs on the forest or road route, keep every run, and review counts, averages and trends."
)]
pub struct Cli {
    /// route to start with (defaults to the last one used)
    #[clap(short = 'r', long, value_enum)]
    route: Option<Category>,

    /// live display refresh interval in milliseconds
    #[clap(short = 't', long)]
    tick_rate_ms: Option<u64>,

    /// directory holding runs, config and log (defaults to ~/.local/state/trailtime)
    #[clap(short = 'd', long)]
    data_dir: Option<PathBuf>,

    /// print run count and averages, then exit
    #[clap(long)]
    summary: bool,

    /// write all runs to a CSV file, then exit
    #[clap(long, value_name = "PATH")]
    export: Option<PathBuf>,
}

impl Cli {
    /// Command-line flags win over the saved config
    fn apply(&self, config: &mut Config) {
        if let Some(route) = self.route {
            config.route = route;
        }
        if let Some(ms) = self.tick_rate_ms {
            config.tick_rate_ms = ms;
        }
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.data_dir {
            Some(dir) => FileConfigStore::with_path(dir.join("config.json")),
            None => FileConfigStore::new(),
        }
    }
}

/// What gets written back on exit: the saved config with the last route.
/// Command-line overrides only last for one run.
fn config_on_exit(saved: &Config, route: Category) -> Config {
    Config {
        route,
        ..saved.clone()
    }
}

fn print_summary<W: Write>(records: &[TimerRecord], out: &mut W) -> io::Result<()> {
    let snapshot = aggregate(records);
    writeln!(out, "Travels: {}", snapshot.count)?;
    writeln!(out, "Average: {}", format_duration(snapshot.global_average))?;
    for category in &snapshot.categories {
        writeln!(
            out,
            "{}: {} runs, avg {}",
            category.category,
            category.count(),
            format_duration(category.average)
        )?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let data_dir = cli
        .data_dir
        .clone()
        .or_else(AppDirs::data_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    if let Err(e) = logging::init(&data_dir.join("trailtime.log")) {
        eprintln!("logging disabled: {e}");
    }

    let config_store = cli.config_store();
    let saved = config_store.load();
    let mut config = saved.clone();
    cli.apply(&mut config);

    let store = RecordStore::new(Box::new(FileKvStore::with_dir(&data_dir)));

    if cli.summary {
        print_summary(&store.load(), &mut io::stdout())?;
        return Ok(());
    }

    if let Some(path) = &cli.export {
        let count = export_to_path(&store.load(), path)?;
        println!("exported {count} runs to {}", path.display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    info!("starting with data in {}", data_dir.display());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(config.tick_interval()),
    );
    let mut app = App::new(store, &config).with_ticks(runner.sender(), runner.tick_interval());
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if let Err(e) = config_store.save(&config_on_exit(&saved, app.route)) {
        warn!("could not save config: {e}");
    }

    result
}

fn start_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    while !app.should_quit {
        if let Some(event) = runner.step(Duration::from_millis(IDLE_POLL_MS)) {
            app.on_event(event);
            terminal.draw(|f| ui::draw(app, f))?;
        }
    }

    Ok(())
}
