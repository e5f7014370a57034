use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use stacked::config::{ConfigError, RunConfig};
use stacked::diagnostic::ansi::AnsiRenderer;
use stacked::diagnostic::{Diagnostic, json, registry};
use stacked::engine::{Engine, Step, render_stack};
use stacked::env::{Environment, Recorder};
use stacked::lexer;

#[derive(Parser, Debug)]
#[command(name = "stacked", version)]
#[command(about = "Run stack programs that steer a character around a grid")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a program from FILE, -e CODE or stdin
    Run(RunArgs),
    /// List the available instructions by category
    Ops {
        /// Emit the listing as JSON
        #[arg(long)]
        json: bool,
        /// Only list these built-ins
        #[arg(long, value_delimiter = ',')]
        allow: Option<Vec<String>>,
    },
    /// Print the long explanation of an error code
    Explain { code: String },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Program file
    file: Option<PathBuf>,

    /// Program text given inline
    #[arg(short = 'e', long = "eval", conflicts_with = "file")]
    code: Option<String>,

    /// JSON run configuration (whitelist, world, limits)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated whitelist of built-ins
    #[arg(long, value_delimiter = ',')]
    allow: Option<Vec<String>>,

    #[arg(long)]
    max_steps: Option<u64>,

    /// Seed for RAND
    #[arg(long)]
    seed: Option<u64>,

    /// Pause after every action, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Initial stack, bottom first
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    stack: Option<Vec<i64>>,

    /// Print a line for every action
    #[arg(long)]
    trace: bool,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[arg(long)]
    no_color: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize, Debug)]
struct RunReport {
    stack: Vec<i64>,
    steps: u64,
    actions: u64,
    position: (i64, i64),
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<serde_json::Value>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("STACKED_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Command::Run(args) => run(args),
        Command::Ops { json, allow } => ops(json, allow),
        Command::Explain { code } => explain(&code),
    };
    std::process::exit(code);
}

fn run(args: RunArgs) -> i32 {
    let use_color = !args.no_color
        && std::env::var_os("NO_COLOR").is_none()
        && std::io::stderr().is_terminal();
    let report = |d: Diagnostic| -> i32 {
        match args.format {
            Format::Text => eprint!("{}", AnsiRenderer { use_color }.render(&d)),
            Format::Json => println!("{}", json::render(&d)),
        }
        1
    };

    let mut config = match &args.config {
        Some(path) => match RunConfig::load(path) {
            Ok(c) => c,
            Err(e) => return report(Diagnostic::from(&e)),
        },
        None => RunConfig::default(),
    };
    if let Some(allow) = &args.allow {
        config.available = Some(allow.clone());
    }
    if let Some(n) = args.max_steps {
        config.max_steps = Some(n);
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(ms) = args.delay_ms {
        config.delay_ms = ms;
    }
    if let Some(stack) = &args.stack {
        config.stack = stack.clone();
    }

    let source = match read_program(args.file.as_deref(), args.code.as_deref()) {
        Ok(s) => s,
        Err(msg) => return report(Diagnostic::error(msg)),
    };
    let terms = match lexer::terms(&source) {
        Ok(t) => t,
        Err(e) => return report(Diagnostic::from(&e).with_source(source)),
    };
    let table = match config.instruction_set() {
        Ok(t) => t,
        Err(e) => return report(Diagnostic::from(&e)),
    };

    let mut env = config.world.recorder();
    let mut engine = Engine::new(terms, table)
        .with_config(config.engine())
        .with_stack(config.stack.clone());
    let delay = Duration::from_millis(config.delay_ms);

    let mut actions = 0u64;
    let error = loop {
        match engine.advance(&mut env) {
            Step::Suspend => {
                actions += 1;
                if args.trace && args.format == Format::Text {
                    println!("{}", trace_line(actions, &env, engine.stack()));
                }
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }
            Step::Done => break None,
            Step::Failed(e) => break Some(e),
            Step::Continue => {}
        }
    };
    debug!(steps = engine.steps(), actions, "run finished");

    match args.format {
        Format::Json => {
            let out = RunReport {
                stack: engine.stack().to_vec(),
                steps: engine.steps(),
                actions,
                position: env.current_position(),
                error: error.as_ref().map(|e| json::to_value(&Diagnostic::from(e))),
            };
            match serde_json::to_string(&out) {
                Ok(s) => println!("{s}"),
                Err(e) => {
                    eprintln!("Serialization error: {e}");
                    return 1;
                }
            }
            i32::from(error.is_some())
        }
        Format::Text => {
            println!("{}", render_stack(engine.stack()));
            match error {
                Some(e) => report(Diagnostic::from(&e)),
                None => 0,
            }
        }
    }
}

fn read_program(file: Option<&Path>, code: Option<&str>) -> Result<String, String> {
    match (file, code) {
        (_, Some(code)) => Ok(code.to_string()),
        (Some(path), None) => std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io { path: path.display().to_string(), source: e }.to_string()),
        (None, None) => std::io::read_to_string(std::io::stdin())
            .map_err(|e| format!("cannot read stdin: {e}")),
    }
}

fn trace_line(n: u64, env: &Recorder, stack: &[i64]) -> String {
    let (x, y) = env.current_position();
    let action = env.moves.last().map_or("-", |d| d.as_str());
    format!("{n:>4} {action:<5} ({x}, {y}) {}", render_stack(stack))
}

fn ops(as_json: bool, allow: Option<Vec<String>>) -> i32 {
    let config = RunConfig { available: allow, ..RunConfig::default() };
    let table = match config.instruction_set() {
        Ok(t) => t,
        Err(e) => {
            eprint!("{}", AnsiRenderer { use_color: false }.render(&Diagnostic::from(&e)));
            return 1;
        }
    };
    let docs = table.docs();

    if as_json {
        match serde_json::to_string_pretty(&docs) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Serialization error: {e}");
                return 1;
            }
        }
        return 0;
    }

    let mut current = None;
    for doc in &docs {
        if current != Some(doc.category) {
            if current.is_some() {
                println!();
            }
            println!("{}:", doc.category);
            current = Some(doc.category);
        }
        println!("  {:<8} {}", doc.name, doc.syntax);
        println!("           {}", doc.description);
    }
    0
}

fn explain(code: &str) -> i32 {
    match registry::lookup(code) {
        Some(entry) => {
            print!("{}", entry.long);
            0
        }
        None => {
            eprintln!("unknown error code '{code}'");
            1
        }
    }
}
