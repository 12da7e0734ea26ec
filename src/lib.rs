/*!
# Daybook

Daybook is a flat-file journal. Every entry is one UTF-8 text file named
`YYYY-MM-DD_HHMM.txt` holding a title line, a JSON array of image file names,
and free text that may open with metadata lines such as `Mood: calm` or
`Tags: work, ideas`.

## Architecture

- `entry`: identifiers, the three-part record format and metadata extraction
- `images`: the image store seam and reference list handling
- `store`: reads, locked writes, moves and deletes of entry files
- `query`: full-scan listing, search, filters, memories and the tag cloud
- `auth`: the authentication gate drivers call before using the store
- `ops`: whole-journal backup, verification and restore
- `cli`, `config`, `constants`, `errors`: the binary's ambient plumbing

## Usage Example

```rust,no_run
use daybook::entry::filename::{parse_date, parse_time, EntryId};
use daybook::entry::record::Record;
use daybook::query::QueryEngine;
use daybook::Config;

fn main() -> daybook::AppResult<()> {
    let config = Config::load()?;
    config.validate()?;

    let store = config.entry_store();
    store.ensure_dir()?;

    let id = EntryId::encode(parse_date("2024-03-01")?, parse_time("09:30")?);
    store.save(&id, &Record::new("Morning", vec![], "Tags: walks\n\nWent for a walk."))?;

    for entry in QueryEngine::new(&store).search("walk")? {
        println!("{} {}", entry.id, entry.title);
    }
    Ok(())
}
```
*/

/// Authentication gate for drivers
pub mod auth;
/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// Entry identifiers, record format and metadata extraction
pub mod entry;
/// Error types and utilities for error handling
pub mod errors;
/// Image store seam and image reference lists
pub mod images;
/// Whole-journal operations such as backup and restore
pub mod ops;
/// Read-time queries over all entries
pub mod query;
/// Entry file persistence with advisory write locks
pub mod store;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use entry::filename::EntryId;
pub use entry::Entry;
pub use errors::{AppError, AppResult};
pub use query::QueryEngine;
pub use store::EntryStore;
