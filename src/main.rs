mod app;
mod domain;
mod engine;
mod events;
mod input;
mod notifications;
mod persistence;
mod ticker;
mod ui;

use anyhow::{Context, Result};
use app::AppState;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use domain::format_clock;
use engine::{ProgressCalculator, TreeIterator};
use persistence::{init_local_cadence, load_plan, plan_file};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "A terminal interval timer for nested, repeatable task plans", long_about = None)]
struct Cli {
    /// Plan file to use. Defaults to .cadence/plan.json (local dir first,
    /// then home)
    #[arg(short, long, global = true)]
    plan: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .cadence directory in the current directory
    Init,
    /// Print a plan's execution order and totals without running it
    Inspect,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            let cadence_dir = init_local_cadence()?;
            println!("Initialized cadence directory: {}", cadence_dir.display());
            println!();
            println!("Cadence will now use this local directory for plan storage.");
            println!("Run 'cadence' to author and run a plan.");
            Ok(())
        }
        Some(Commands::Inspect) => {
            let plan_path = resolve_plan_path(cli.plan)?;
            inspect_plan(&plan_path)
        }
        None => {
            let plan_path = resolve_plan_path(cli.plan)?;
            run_tui(plan_path)
        }
    }
}

fn resolve_plan_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => plan_file(),
    }
}

/// Linearize a plan and print the sequence, failing fast with a diagnostic
/// on a malformed tree
fn inspect_plan(plan_path: &PathBuf) -> Result<()> {
    let plan = load_plan(plan_path)?;
    let iterator = TreeIterator::new(&plan)
        .with_context(|| format!("Cannot linearize plan: {}", plan_path.display()))?;
    let calc = ProgressCalculator::new(iterator);

    println!("Plan: {}", plan_path.display());
    println!();

    if calc.is_empty() {
        println!("  (no runnable tasks)");
        return Ok(());
    }

    for (index, task) in calc.tasks().iter().enumerate() {
        let detail = match task.duration {
            Some(seconds) => format_clock(u64::from(seconds)),
            None => "stopwatch".to_string(),
        };
        println!("  {:>3}. {}  [{}]", index + 1, task.title, detail);
    }

    println!();
    let qualifier = if calc.total_known() { "" } else { "at least " };
    println!(
        "  {} task instances, {}{}",
        calc.len(),
        qualifier,
        format_clock(calc.total_seconds())
    );
    if !calc.total_known() {
        println!("  (open-ended stopwatches make the total a lower bound)");
    }
    Ok(())
}

fn run_tui(plan_path: PathBuf) -> Result<()> {
    eprintln!("Using plan file: {}", plan_path.display());

    let plan = load_plan(&plan_path)?;
    let mut app = AppState::new(plan, plan_path);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Save on exit
    if let Err(e) = app.save() {
        eprintln!("Error saving plan: {}", e);
    }

    // Print any errors
    if let Err(err) = result {
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let tick_rate = ticker::tick_duration();

    loop {
        // Render
        terminal.draw(|f| ui::render(f, app))?;

        // Handle events with timeout for ticking
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press {
                    let should_quit = input::handle_key(app, key)?;
                    if should_quit {
                        return Ok(());
                    }
                }
            }
        }

        // Pump engine ticks
        app.tick()?;

        // Autosave if needed
        if app.needs_save {
            app.save()?;
        }
    }
}
