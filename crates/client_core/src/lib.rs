//! Client side of the security control inventory: the `/items` HTTP API and a
//! table view kept in sync with it.

pub mod error;
pub mod export;
pub mod prompt;
pub mod table_sync;
pub mod transport;
pub mod types;

pub use error::ClientError;
pub use export::EXPORT_FILE_NAME;
pub use prompt::Prompt;
pub use table_sync::{Outcome, TableSyncClient};
pub use transport::{ControlsApi, HttpControlsApi};
pub use types::{ControlForm, ControlTable, EditSession, FormAction, FormField, TableRow};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
