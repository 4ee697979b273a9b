// tracelens: code structure extraction with a replayable execution trace

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use tracelens::config::ExtractOptions;
use tracelens::orchestrator::ParseOrchestrator;
use tracelens::parser::patterns::Dialect;
use tracelens::parser::records::{ParseStatus, ParsedProgram};
use tracelens::prompt::{self, PromptKind};
use tracelens::ui::App;

/// What to do with the extracted model
enum OutputMode {
    Replay,
    Json,
    Prompt(PromptKind),
}

struct CliArgs {
    file: PathBuf,
    dialect: Option<Dialect>,
    mode: OutputMode,
    seed: Option<u64>,
}

fn print_usage(program_name: &str) {
    eprintln!(
        "Usage: {} <file> [--lang javascript|python] [--json | --prompt visualize|explain] [--seed N]",
        program_name
    );
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} sort.js                     # Replay the trace in the TUI", program_name);
    eprintln!("  {} script.txt --lang python    # Force the dialect", program_name);
    eprintln!("  {} sort.js --json              # Print the parsed model", program_name);
    eprintln!("  {} shapes.py --prompt explain  # Print a request body", program_name);
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut file = None;
    let mut dialect = None;
    let mut mode = OutputMode::Replay;
    let mut seed = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--lang" | "-l" => {
                let tag = iter.next().ok_or("--lang needs a value")?;
                dialect = Some(Dialect::from_tag(tag));
            }
            "--json" => mode = OutputMode::Json,
            "--prompt" => {
                let tag = iter.next().ok_or("--prompt needs a value")?;
                let kind = PromptKind::from_tag(tag)
                    .ok_or_else(|| format!("Unknown prompt kind '{}'", tag))?;
                mode = OutputMode::Prompt(kind);
            }
            "--seed" => {
                let value = iter.next().ok_or("--seed needs a value")?;
                let parsed = value
                    .parse::<u64>()
                    .map_err(|e| format!("Invalid seed '{}': {}", value, e))?;
                seed = Some(parsed);
            }
            other if other.starts_with('-') => {
                return Err(format!("Unknown option '{}'", other));
            }
            other => {
                if file.is_some() {
                    return Err(format!("Unexpected argument '{}'", other));
                }
                file = Some(PathBuf::from(other));
            }
        }
    }

    Ok(CliArgs {
        file: file.ok_or("No input file provided")?,
        dialect,
        mode,
        seed,
    })
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tracelens=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_summary(program: &ParsedProgram, file: &Path) {
    eprintln!(
        "Scanned {} as {}: {} functions, {} variables, {} loops, {} conditions, {} classes, {} arrays, {} imports, {} comments.",
        file.display(),
        program.language,
        program.functions.len(),
        program.variables.len(),
        program.loops.len(),
        program.conditions.len(),
        program.classes.len(),
        program.arrays.len(),
        program.imports.len(),
        program.comments.len(),
    );
    eprintln!("Total steps: {}", program.execution.steps());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("tracelens");

    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!();
            print_usage(program_name);
            std::process::exit(1);
        }
    };

    if !cli.file.exists() {
        eprintln!("Error: File '{}' not found", cli.file.display());
        std::process::exit(1);
    }

    let source = fs::read_to_string(&cli.file)?;
    let dialect = cli
        .dialect
        .or_else(|| Dialect::from_path(&cli.file))
        .unwrap_or(Dialect::Unsupported);

    let mut options = ExtractOptions::default();
    options.timing_seed = cli.seed;
    let orchestrator = ParseOrchestrator::new(options);

    let program = orchestrator.run_with(&source, dialect, &mut |p: &ParsedProgram| {
        print_summary(p, &cli.file)
    });

    match program.status {
        ParseStatus::UnsupportedDialect => {
            eprintln!(
                "Unsupported language for '{}'; pass --lang javascript|python",
                cli.file.display()
            );
        }
        ParseStatus::EmptyInput => eprintln!("'{}' is empty", cli.file.display()),
        _ => {}
    }
    for diagnostic in &program.diagnostics {
        match diagnostic.kind() {
            Some(kind) => eprintln!("Warning [{}]: {}", kind, diagnostic),
            None => tracing::debug!(%diagnostic, "extraction diagnostic"),
        }
    }

    match cli.mode {
        OutputMode::Json => {
            println!("{}", program.to_json()?);
        }
        OutputMode::Prompt(kind) => {
            let body = prompt::build_request(kind, &program, &source)?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputMode::Replay => run_replay(program, source)?,
    }

    Ok(())
}

fn run_replay(program: ParsedProgram, source: String) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(program, source);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
