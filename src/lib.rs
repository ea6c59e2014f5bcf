pub mod cli;
pub mod download;
pub mod error;
pub mod filter;
pub mod parser;
pub mod schema;
pub mod ui;
pub mod writer;

pub use cli::{Cli, Commands};
pub use error::{IngestError, LoadError};
pub use ui::{ConsoleUi, Phase, SilentUi, Ui, UiApp};
