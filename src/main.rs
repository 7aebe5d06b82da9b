use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use webcee_native::sim::{Bootstrap, Request, Session};
use webcee_native::{lint, render_to_html, ProjectSymbols, RenderOptions, Severity};

#[derive(Parser)]
#[command(name = "webcee")]
#[command(about = "WebCee DSL tools: render previews, check sources, simulate the backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a .wce file to a standalone HTML page
    Render {
        /// Source file
        file: PathBuf,

        /// Simulation bootstrap JSON to embed
        #[arg(long)]
        bootstrap: Option<PathBuf>,

        /// URL of the page runtime script
        #[arg(long)]
        runtime_src: Option<String>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report diagnostics for a .wce file
    Check {
        /// Source file
        file: PathBuf,

        /// Known event handler name (repeatable)
        #[arg(long = "handler")]
        handlers: Vec<String>,

        /// Known data key (repeatable)
        #[arg(long = "key")]
        keys: Vec<String>,
    },

    /// Send requests to a simulated backend and print the responses
    Simulate {
        /// Simulation bootstrap JSON
        #[arg(long)]
        bootstrap: PathBuf,

        /// Requests such as "POST /api/trigger?event=inc"
        #[arg(required = true)]
        requests: Vec<String>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Render {
            file,
            bootstrap,
            runtime_src,
            output,
        } => render(&file, bootstrap.as_deref(), runtime_src, output.as_deref()),
        Commands::Check {
            file,
            handlers,
            keys,
        } => check(&file, handlers, keys),
        Commands::Simulate {
            bootstrap,
            requests,
        } => simulate(&bootstrap, &requests),
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn render(
    file: &Path,
    bootstrap: Option<&Path>,
    runtime_src: Option<String>,
    output: Option<&Path>,
) -> Result<()> {
    let source = read_source(file)?;
    let sim_bootstrap = bootstrap
        .map(Bootstrap::load)
        .transpose()
        .context("failed to load simulation bootstrap")?;
    let options = RenderOptions {
        runtime_script_src: runtime_src,
        sim_bootstrap,
    };

    let out = render_to_html(&source, &options);
    for error in &out.errors {
        log::warn!("{}: {}", file.display(), error);
    }

    match output {
        Some(path) => std::fs::write(path, &out.html)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", out.html),
    }
    Ok(())
}

fn check(file: &Path, handlers: Vec<String>, keys: Vec<String>) -> Result<()> {
    let source = read_source(file)?;
    let symbols = ProjectSymbols {
        event_handlers: handlers.into_iter().collect::<HashSet<_>>(),
        data_keys: keys.into_iter().collect::<HashSet<_>>(),
    };

    let diagnostics = lint(&source, &symbols);
    for d in &diagnostics {
        let (line, col) = webcee_native::render::offset_to_line_col(&source, d.range.start);
        println!(
            "{}:{}:{}: {}: {}",
            file.display(),
            line + 1,
            col + 1,
            d.severity,
            d.message
        );
    }

    if diagnostics.iter().any(|d| d.severity == Severity::Error) {
        std::process::exit(1);
    }
    Ok(())
}

fn simulate(bootstrap: &Path, requests: &[String]) -> Result<()> {
    let bootstrap = Bootstrap::load(bootstrap).context("failed to load simulation bootstrap")?;
    let mut session = Session::new(&bootstrap);

    for line in requests {
        let req = Request::parse_line(line)?;
        match session.dispatch(&req) {
            Some(handled) => println!(
                "{} {} -> {} {}",
                req.method, req.path, handled.response.status, handled.response.body
            ),
            None => println!("{} {} -> not handled", req.method, req.path),
        }
    }
    Ok(())
}
