//! `recur` CLI — expand recurring bookings and preview them against existing
//! reservations from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Expand a recurrence (stdin → stdout)
//! echo '{"start_date":"2026-03-02","end_date":"2026-03-29","start_time":"10:00",
//!        "end_time":"11:00","weekdays":[0,2],"cadence":"biweekly"}' | recur expand
//!
//! # Pin "today" instead of using the current UTC date
//! recur expand --today 2026-03-01 -i recurrence.json
//!
//! # Preview against a busy snapshot, with manual removals, written to a file
//! recur preview -i request.json -o preview.json
//!
//! # Show why an occurrence list came out empty
//! recur -v expand -i recurrence.json
//! ```
//!
//! Logs go to stderr. `RUST_LOG` sets the filter (default `warn`); `-v`
//! forces `debug`.

use std::io::{self, IsTerminal, Read};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use recurrence_engine::recurrence::parse_date;
use recurrence_engine::{
    effective_set, preview, summarize, try_expand_input, AnnotatedOccurrence, Buffers,
    BusyInterval, Clock, FixedClock, Occurrence, OccurrenceKind, OccurrenceSummary,
    RecurrenceInput, RemovalSet, SystemClock,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "recur",
    version,
    about = "Expand recurring bookings and check them against existing reservations"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Date treated as today (YYYY-MM-DD or D.M.YYYY); defaults to the current UTC date
    #[arg(long, global = true)]
    today: Option<String>,

    /// Log engine decisions to stderr at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a recurrence into its occurrences
    Expand {
        /// Input file with a recurrence object (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Expand a recurrence and flag occurrences that collide with busy intervals
    Preview {
        /// Input file with a preview request (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Everything `recur preview` needs in one JSON document.
#[derive(Deserialize)]
struct PreviewRequest {
    recurrence: RecurrenceInput,
    #[serde(default)]
    busy: Vec<BusyInterval>,
    /// Kind the new reservations will be created as.
    #[serde(default)]
    kind: OccurrenceKind,
    /// Buffers of the reserved resource, applied to every occurrence.
    #[serde(flatten)]
    buffers: Buffers,
    #[serde(default)]
    removed: RemovalSet,
}

#[derive(Serialize)]
struct PreviewResponse {
    occurrences: Vec<AnnotatedOccurrence>,
    effective: Vec<Occurrence>,
    summary: OccurrenceSummary,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let today = clock_from_arg(cli.today.as_deref())?.today();
    tracing::debug!(%today, "resolved today");

    match cli.command {
        Commands::Expand { input, output } => {
            let raw = read_input(input.as_deref())?;
            let recurrence: RecurrenceInput =
                serde_json::from_str(&raw).context("Failed to parse recurrence JSON")?;

            let occurrences = try_expand_input(&recurrence, today).unwrap_or_else(|e| {
                tracing::warn!(reason = %e, "recurrence is invalid, nothing to expand");
                Vec::new()
            });

            write_json(output.as_deref(), &occurrences)?;
        }
        Commands::Preview { input, output } => {
            let raw = read_input(input.as_deref())?;
            let request: PreviewRequest =
                serde_json::from_str(&raw).context("Failed to parse preview request JSON")?;

            let response = run_preview(&request, today);
            write_json(output.as_deref(), &response)?;
        }
    }

    Ok(())
}

fn run_preview(request: &PreviewRequest, today: NaiveDate) -> PreviewResponse {
    let occurrences = match request.recurrence.parse() {
        Ok(spec) => preview(
            &spec,
            today,
            &request.busy,
            request.kind,
            request.buffers,
        )
        .unwrap_or_else(|never| match never {}),
        Err(e) => {
            tracing::warn!(reason = %e, "recurrence is invalid, nothing to expand");
            Vec::new()
        }
    };

    PreviewResponse {
        effective: effective_set(&occurrences, &request.removed),
        summary: summarize(&occurrences, &request.removed),
        occurrences,
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_ansi(io::stderr().is_terminal()),
        )
        .init();
}

/// `--today` pins a [`FixedClock`]; without it the wall clock is used.
fn clock_from_arg(arg: Option<&str>) -> Result<Box<dyn Clock>> {
    match arg {
        Some(raw) => {
            let date =
                parse_date(raw).with_context(|| format!("Invalid --today date: {}", raw))?;
            Ok(Box::new(FixedClock(date)))
        }
        None => Ok(Box::new(SystemClock)),
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_json<T: Serialize>(path: Option<&str>, value: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    content.push('\n');
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
