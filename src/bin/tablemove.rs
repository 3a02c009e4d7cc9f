//! tablemove CLI - span-aware row and column reordering for tables

#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;
use tablemove::{
    diagnostics::{check_document, format_diagnostics},
    movable_column_indices, movable_row_indices, valid_column_drop_positions,
    valid_row_drop_positions, Axis, Document, FilledMatrix, MoveOptions, MoveValidation,
    MoveValidator, Path, TableResult,
};
use tracing::{debug, info};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "tablemove")]
#[command(version)]
#[command(about = "Span-aware row and column reordering for tables with merged cells", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log more (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct InputArgs {
    /// Input file path (reads from stdin if not provided)
    input: Option<String>,

    /// Read (and write) the JSON document form instead of notation
    #[arg(long)]
    json: bool,

    /// Path of the table to work on, e.g. `1` or `1,0,2` (first table if omitted)
    #[arg(short, long, value_parser = parse_path)]
    table: Option<Path>,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Report span problems that affect moves
    Check {
        #[command(flatten)]
        input: InputArgs,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print the filled matrix of a table
    Grid {
        #[command(flatten)]
        input: InputArgs,
    },

    /// List the rows and columns that can be dragged
    Movable {
        #[command(flatten)]
        input: InputArgs,
    },

    /// List the legal destinations of one row or column
    Targets {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short, long, value_enum)]
        axis: AxisArg,

        /// Index of the row or column being dragged
        #[arg(short, long)]
        source: usize,
    },

    /// Move a row
    MoveRow {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long)]
        from: usize,

        #[arg(long)]
        to: usize,

        /// Output file path (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Move a column
    MoveColumn {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long)]
        from: usize,

        #[arg(long)]
        to: usize,

        /// Output file path (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum AxisArg {
    Row,
    Column,
}

#[cfg(feature = "cli")]
impl From<AxisArg> for Axis {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::Row => Axis::Row,
            AxisArg::Column => Axis::Column,
        }
    }
}

#[cfg(feature = "cli")]
fn parse_path(s: &str) -> Result<Path, String> {
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| format!("'{}' is not a node index", part.trim()))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Path::new)
}

#[cfg(feature = "cli")]
fn init_logging(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .try_init()
        .ok(); // Ignore error if already initialized
}

#[cfg(feature = "cli")]
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "cli")]
fn load(args: &InputArgs) -> TableResult<(Document, MoveOptions)> {
    let content = match args.input {
        Some(ref path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let doc = if args.json {
        Document::from_json(&content)?
    } else {
        Document::from_notation(&content)?
    };
    debug!(tables = doc.tables().len(), "document loaded");

    let options = MoveOptions {
        at: args.table.clone(),
    };
    Ok((doc, options))
}

#[cfg(feature = "cli")]
fn format_indices(indices: &[usize]) -> String {
    if indices.is_empty() {
        return "(none)".to_string();
    }
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(feature = "cli")]
fn run(command: Commands) -> TableResult<ExitCode> {
    match command {
        Commands::Check { input, no_color } => {
            let (doc, options) = load(&input)?;
            let result = match options.at {
                Some(ref at) => tablemove::diagnostics::check_table(&doc, Some(at)),
                None => check_document(&doc),
            };
            println!("{}", format_diagnostics(&result, !no_color));

            // Exit with error code if there are errors
            if result.has_errors() {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Grid { input } => {
            let (doc, options) = load(&input)?;
            let matrix = FilledMatrix::build(&doc, options.at.as_ref())?;
            print!("{}", matrix.describe(&doc));
        }

        Commands::Movable { input } => {
            let (doc, options) = load(&input)?;
            println!(
                "rows:    {}",
                format_indices(&movable_row_indices(&doc, &options))
            );
            println!(
                "columns: {}",
                format_indices(&movable_column_indices(&doc, &options))
            );
        }

        Commands::Targets {
            input,
            axis,
            source,
        } => {
            let (doc, options) = load(&input)?;
            let targets = match Axis::from(axis) {
                Axis::Row => valid_row_drop_positions(&doc, source, &options),
                Axis::Column => valid_column_drop_positions(&doc, source, &options),
            };
            println!("{}", format_indices(&targets));
        }

        Commands::MoveRow {
            input,
            from,
            to,
            output,
        } => {
            return move_and_write(&input, Axis::Row, from, to, output);
        }

        Commands::MoveColumn {
            input,
            from,
            to,
            output,
        } => {
            return move_and_write(&input, Axis::Column, from, to, output);
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "cli")]
fn move_and_write(
    input: &InputArgs,
    axis: Axis,
    from: usize,
    to: usize,
    output: Option<String>,
) -> TableResult<ExitCode> {
    let (mut doc, options) = load(input)?;

    let validation = match MoveValidator::new(&doc, &options) {
        Ok(validator) => validator.validate(axis, from, to),
        Err(err) => {
            eprintln!("error: {}", err);
            return Ok(ExitCode::FAILURE);
        }
    };
    if !validation.can_move {
        report_rejection(&validation);
        return Ok(ExitCode::FAILURE);
    }

    let moved = match axis {
        Axis::Row => tablemove::execute_row_move(&mut doc, from, to, &options),
        Axis::Column => tablemove::execute_column_move(&mut doc, from, to, &options),
    };
    if !moved {
        eprintln!("error: the {} move could not be applied", axis);
        return Ok(ExitCode::FAILURE);
    }
    info!(%axis, from, to, "moved");

    let rendered = if input.json {
        doc.to_json()?
    } else {
        doc.to_notation()
    };

    match output {
        Some(path) => {
            let mut file = fs::File::create(&path)?;
            write!(file, "{}", rendered)?;
            eprintln!("✓ Output written to: {}", path);
        }
        None => {
            print!("{}", rendered);
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "cli")]
fn report_rejection(validation: &MoveValidation) {
    let tag = validation
        .blocked_by
        .map(|b| b.as_str())
        .unwrap_or("unknown");
    let reason = validation.reason.as_deref().unwrap_or("move rejected");
    eprintln!("✗ {} [{}]", reason, tag);
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
}
