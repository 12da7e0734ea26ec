/*!
# Daybook - A Flat-File Journal

Daybook keeps one plain-text file per journal entry, named by the date and
time it was written. Entries carry a title, optional metadata lines
(location, weather, mood, plans, tags), free text and attached images.

This file contains the main application flow: logging setup, configuration,
authentication and dispatch of the chosen subcommand.

## Usage

```text
daybook <COMMAND>

Commands:
  list           List entries, newest first
  show           Show one entry
  save           Create or overwrite the entry for a date and time
  move           Move an entry to another date and time
  delete         Delete an entry and its images
  search         Search titles and contents, ignoring case
  tag            List entries carrying a tag
  month          List entries for a month (YYYY-MM)
  day            List entries for a day (YYYY-MM-DD)
  memories       Entries written on this day in past years
  tags           Tag cloud
  attach         Attach an image file to an entry
  detach         Remove an image from an entry
  stats          Corpus statistics
  backup         Write a tar.gz backup of entries and images
  verify-backup  Check a backup archive without restoring it
  restore        Restore a backup into an empty or missing directory
```

## Configuration

- `DAYBOOK_DIR`: entries directory (defaults to `~/Documents/daybook/entries`)
- `DAYBOOK_IMAGES_DIR`: image directory (defaults to `images` next to the entries directory)
- `DAYBOOK_PAGE_SIZE`: entries per listing page (defaults to 20)
- `DAYBOOK_MAX_IMAGE_BYTES`: largest accepted image (defaults to 10 MiB)
- `DAYBOOK_LOG_FORMAT`: `text` or `json` log output on stderr (defaults to `text`)
- `RUST_LOG`: log filter (defaults to `info`)
*/

use chrono::Local;
use clap::Parser;
use daybook::auth::{Authenticator, LocalSession, RequestContext};
use daybook::cli::{self, CliArgs};
use daybook::config::Config;
use daybook::constants::{
    DEFAULT_LOG_LEVEL, ENV_VAR_DAYBOOK_LOG_FORMAT, LOG_FORMAT_JSON, LOG_FORMAT_TEXT,
};
use daybook::errors::{AppError, AppResult};
use std::io;
use tracing::{debug, error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = CliArgs::parse();

    if let Err(e) = init_logging() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(args) {
        // Logged once here; library code returns errors without logging them.
        error!(error = %e, "daybook failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Installs the tracing subscriber: an env filter plus a text or JSON
/// formatter on stderr.
fn init_logging() -> AppResult<()> {
    let format =
        std::env::var(ENV_VAR_DAYBOOK_LOG_FORMAT).unwrap_or_else(|_| LOG_FORMAT_TEXT.to_string());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        LOG_FORMAT_JSON => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init(),
        LOG_FORMAT_TEXT => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init(),
        other => {
            return Err(AppError::Config(format!(
                "{} must be '{}' or '{}', got {:?}",
                ENV_VAR_DAYBOOK_LOG_FORMAT, LOG_FORMAT_TEXT, LOG_FORMAT_JSON, other
            )))
        }
    }
    Ok(())
}

/// Loads configuration, authenticates the local user and runs the command.
fn run(args: CliArgs) -> AppResult<()> {
    info!("Starting daybook");
    debug!("CLI arguments: {:?}", args);

    let config = Config::load()?;
    config.validate()?;
    debug!("Configuration: {:?}", config);

    LocalSession::from_env().require_authenticated(&RequestContext::from_env())?;

    let now = Local::now().naive_local();
    let stdout = io::stdout();
    cli::execute(args.command, &config, now, &mut stdout.lock())?;

    debug!("Command completed");
    Ok(())
}
