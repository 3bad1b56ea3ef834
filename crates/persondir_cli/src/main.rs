//! Person directory command-line transport.
//!
//! # Responsibility
//! - Resolve configuration once at start: file, environment, then flags.
//! - Serve JSON request lines from a file or stdin, one response per line.

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use clap::Parser;
use persondir_cli::api::serve;
use persondir_core::{
    core_version, default_log_level, init_logging, Clock, DirectoryConfig, DirectoryService,
    FixedClock, InMemoryPersonStore,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

/// Serve person directory requests as JSON lines.
#[derive(Debug, Parser)]
#[command(name = "persondir", version)]
struct Args {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum allowed age in years; overrides config and environment.
    #[arg(long)]
    min_age: Option<u32>,

    /// Reject registrations whose email is already stored.
    #[arg(long)]
    reject_duplicates: bool,

    /// Pin "today" (YYYY-MM-DD) for reproducible replays.
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Request file; stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, requires = "log_dir")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off without it.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(log_dir) = &args.log_dir {
        let level = args.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| anyhow!("log dir must be valid UTF-8"))?;
        init_logging(level, log_dir).map_err(|err| anyhow!(err))?;
    }

    let mut config = DirectoryConfig::load(args.config.as_deref())?;
    if let Some(min_age) = args.min_age {
        config.min_allowed_age = min_age;
    }
    if args.reject_duplicates {
        config.reject_duplicate_email = true;
    }

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    match args.today {
        Some(today) => run(
            DirectoryService::new(InMemoryPersonStore::new(), FixedClock(today), config),
            reader,
        ),
        None => run(DirectoryService::in_memory(config), reader),
    }
}

fn run<C: Clock>(
    service: DirectoryService<InMemoryPersonStore, C>,
    reader: Box<dyn BufRead>,
) -> anyhow::Result<()> {
    let config = service.config();
    log::info!(
        "event=config_resolved module=cli status=ok version={} today={} min_allowed_age={} reject_duplicate_email={}",
        core_version(),
        service.today(),
        config.min_allowed_age,
        config.reject_duplicate_email
    );

    let served = serve(&service, reader, io::stdout().lock()).context("request stream failed")?;
    log::info!("event=session_end module=cli status=ok served={served}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;

    #[test]
    fn log_level_requires_log_dir() {
        let err = Args::try_parse_from(["persondir", "--log-level", "info"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let args =
            Args::try_parse_from(["persondir", "--log-level", "info", "--log-dir", "/tmp/logs"])
                .unwrap();
        assert_eq!(args.log_level.as_deref(), Some("info"));
    }
}
