pub mod report;
pub mod schema_gen;
pub mod sqlite;

pub use report::*;
pub use schema_gen::*;
pub use sqlite::*;
