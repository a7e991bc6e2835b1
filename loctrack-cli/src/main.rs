use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "loctrack",
    about = "loctrack — inspect shared genomic claim stores",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump the claim history of a shared store, one record per line
    Inspect {
        /// Path to the shared SQLite claim store
        #[arg(long, env = "LOCTRACK_STORE")]
        store: PathBuf,

        /// Only show records whose span overlaps this one (contig:start-stop)
        #[arg(long)]
        interval: Option<loctrack_core::types::GenomeSpan>,
    },

    /// Print version information
    Version,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { store, interval } => inspect::run(&store, interval.as_ref()),
        Commands::Version => {
            println!("loctrack {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
    }
}

#[cfg(feature = "sqlite")]
mod inspect {
    use loctrack_core::error::CoordError;
    use loctrack_core::store::ClaimStore;
    use loctrack_core::store_sqlite::SqliteClaimStore;
    use loctrack_core::types::{GenomeSpan, Interval};
    use std::path::Path;
    use std::process::ExitCode;
    use tracing::debug;

    pub fn run(path: &Path, filter: Option<&GenomeSpan>) -> ExitCode {
        match dump(path, filter) {
            Ok(count) => {
                debug!(records = count, "inspect finished");
                ExitCode::SUCCESS
            }
            // Corrupt history is the signal workers abort on; make it
            // distinguishable from plain I/O trouble.
            Err(e @ CoordError::CorruptState { .. }) => {
                eprintln!("{}", e);
                ExitCode::from(2)
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        }
    }

    /// Reads the store without the coordination lock. Advisory only:
    /// SQLite rows are atomic, so the worst a racing writer can do is
    /// leave the tail of the history out of this dump.
    fn dump(path: &Path, filter: Option<&GenomeSpan>) -> Result<usize, CoordError> {
        if !path.exists() {
            return Err(CoordError::Unavailable {
                reason: format!("no claim store at '{}'", path.display()),
            });
        }

        let mut store: SqliteClaimStore<GenomeSpan> = SqliteClaimStore::open(path)?;
        let mut records = store.drain_new()?;
        if let Some(filter) = filter {
            records.retain(|r| r.interval.key() == filter.key() || r.interval.overlaps(filter));
        }

        for record in &records {
            println!(
                "{}\t{}\t{}\t{}",
                record.interval, record.owner, record.state, record.recorded_at
            );
        }
        Ok(records.len())
    }
}

#[cfg(not(feature = "sqlite"))]
mod inspect {
    use loctrack_core::types::GenomeSpan;
    use std::path::Path;
    use std::process::ExitCode;

    pub fn run(_path: &Path, _filter: Option<&GenomeSpan>) -> ExitCode {
        eprintln!("this binary was built without sqlite support");
        ExitCode::FAILURE
    }
}
