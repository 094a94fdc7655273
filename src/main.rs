//! Thin CLI front end: wires stdin/file reading and stdout/file writing to
//! the library's `clean`/`split`/`merge` entry points. Carries no business
//! logic of its own.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use gcodeclean::{clean, merge, split, AnnotationDictionary, Config};

#[derive(Parser)]
#[command(name = "gcodeclean", about = "Clean, split and merge G-code motion programs")]
struct Opts {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clean a G-code file (or stdin) and write the result to stdout or a file.
    Clean {
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        annotate: Option<PathBuf>,
        /// Print a one-line summary of lines read/written/dropped to stderr.
        #[arg(long)]
        report: bool,
    },
    /// Split a cleaned file into one file per cutting pass.
    Split {
        input: PathBuf,
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        #[arg(short, long)]
        tool: String,
    },
    /// Merge a directory of split files into one low-travel-ordered program.
    Merge {
        dir: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match run(Opts::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gcodeclean: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(opts: Opts) -> gcodeclean::Result<()> {
    match opts.command {
        Command::Clean { input, output, config, annotate, report } => run_clean(input, output, config, annotate, report),
        Command::Split { input, out_dir, tool } => run_split(&input, &out_dir, &tool),
        Command::Merge { dir, output } => run_merge(&dir, &output),
    }
}

fn run_clean(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    annotate_path: Option<PathBuf>,
    report: bool,
) -> gcodeclean::Result<()> {
    let text = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let cfg = match config_path {
        Some(path) => Config::parse(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    let annotation = match annotate_path {
        Some(path) => Some(AnnotationDictionary::parse(&fs::read_to_string(path)?)?),
        None => None,
    };

    let (lines, summary) = clean(text.lines().map(|l| l.to_string()), &cfg, annotation);
    let rendered = lines.join("\n");

    match output {
        Some(path) => fs::write(path, rendered)?,
        None => io::stdout().write_all(rendered.as_bytes())?,
    }
    if report {
        eprintln!(
            "lines read: {}, written: {}, dropped: {}",
            summary.lines_read, summary.lines_written, summary.lines_dropped
        );
    }
    Ok(())
}

fn run_split(input: &std::path::Path, out_dir: &std::path::Path, tool: &str) -> gcodeclean::Result<()> {
    let text = fs::read_to_string(input)?;
    let lines: Vec<gcodeclean::Line> = text.lines().map(gcodeclean::Line::new).collect();
    fs::create_dir_all(out_dir)?;
    for file in split(&lines, tool) {
        fs::write(out_dir.join(&file.filename), &file.content)?;
    }
    Ok(())
}

fn run_merge(dir: &std::path::Path, output: &std::path::Path) -> gcodeclean::Result<()> {
    match merge(dir)? {
        Some(text) => fs::write(output, text)?,
        None => return Err(gcodeclean::GcodeCleanError::NoInputFiles(dir.to_path_buf())),
    }
    Ok(())
}
