use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use crossterm::event::KeyEventKind;

use mtop::app::App;
use mtop::config::{Config, load_config, load_config_from_path};
use mtop::event::{Event, EventHandler};
use mtop::system::collector::Collector;
use mtop::system::policy::SortKey;
use mtop::ui;

/// Sort key accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Memory,
    Cpu,
    Pid,
    Name,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Memory => SortKey::Memory,
            SortArg::Cpu => SortKey::Cpu,
            SortArg::Pid => SortKey::Pid,
            SortArg::Name => SortKey::Name,
        }
    }
}

#[derive(Parser)]
#[command(name = "mtop", about = "Minimal terminal process monitor", version)]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Update interval in seconds
    #[arg(short, long)]
    delay: Option<u64>,

    /// Maximum number of processes to show
    #[arg(short = 'n', long)]
    max_processes: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Sort key
    #[arg(long, value_enum, value_name = "KEY")]
    sort: Option<SortArg>,

    /// Sort processes by memory usage (default)
    #[arg(long, conflicts_with_all = ["sort", "sort_cpu", "sort_pid", "sort_name"])]
    sort_memory: bool,

    /// Sort processes by CPU usage
    #[arg(long, conflicts_with_all = ["sort", "sort_pid", "sort_name"])]
    sort_cpu: bool,

    /// Sort processes by PID
    #[arg(long, conflicts_with_all = ["sort", "sort_name"])]
    sort_pid: bool,

    /// Sort processes by name
    #[arg(long, conflicts_with = "sort")]
    sort_name: bool,

    /// Reverse sort order
    #[arg(long)]
    reverse: bool,

    /// Include kernel threads in the list
    #[arg(long)]
    show_kernel_threads: bool,

    /// Print one snapshot as JSON and exit
    #[arg(long)]
    once: bool,

    /// Write the effective configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    write_config: Option<PathBuf>,

    /// Write diagnostic logs to FILE
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }
    let config = load_config_for_cli(&cli);

    if let Some(path) = &cli.write_config {
        config
            .save(path)
            .wrap_err_with(|| format!("writing config to {}", path.display()))?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    if cli.once {
        return print_once(&config).await;
    }

    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let result = run(&mut terminal, config).await;

    ratatui::restore();

    result
}

async fn run(terminal: &mut ratatui::DefaultTerminal, config: Config) -> Result<()> {
    let mut app = App::new(config);
    let mut events = EventHandler::new(app.tick_rate());

    terminal.draw(|frame| ui::draw(frame, &app))?;

    // `running` is only checked between events, so a refresh always completes.
    while app.running {
        let Some(event) = events.next().await else {
            break;
        };
        let should_draw = match event {
            Event::Key(key) => {
                if key.kind == KeyEventKind::Press {
                    let action = app.map_key(key);
                    app.dispatch(action);
                    true
                } else {
                    false
                }
            }
            Event::Tick => {
                app.refresh_data();
                true
            }
            Event::Resize => true,
        };
        if should_draw && app.running {
            terminal.draw(|frame| ui::draw(frame, &app))?;
        }
    }

    Ok(())
}

/// Two samples one interval apart so the CPU figure has a baseline.
async fn print_once(config: &Config) -> Result<()> {
    let policy = config.policy();
    let mut collector = Collector::new();
    collector.sample();
    tokio::time::sleep(Duration::from_secs(config.display.update_interval.max(1))).await;
    let snapshot = collector.refresh(&policy);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).wrap_err_with(|| format!("creating {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| color_eyre::eyre::eyre!("failed to set tracing subscriber: {e}"))?;
    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };
    apply_overrides(&mut config, cli);
    config
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(delay) = cli.delay {
        config.display.update_interval = delay;
    }
    if let Some(max) = cli.max_processes {
        config.display.max_processes = max;
    }
    if cli.no_color {
        config.display.show_colors = false;
    }
    if let Some(key) = cli.sort {
        config.processes.sort_by = key.into();
    }
    let shorthand = [
        (cli.sort_memory, SortKey::Memory),
        (cli.sort_cpu, SortKey::Cpu),
        (cli.sort_pid, SortKey::Pid),
        (cli.sort_name, SortKey::Name),
    ];
    if let Some((_, key)) = shorthand.into_iter().find(|(set, _)| *set) {
        config.processes.sort_by = key;
    }
    if cli.reverse {
        config.processes.reverse_sort = true;
    }
    if cli.show_kernel_threads {
        config.processes.show_kernel_threads = true;
    }
}
