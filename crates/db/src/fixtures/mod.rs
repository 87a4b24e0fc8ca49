//! Fixture engines: dump registered models to records, and load records
//! back inside a single transaction.

mod dump;
mod load;

pub use dump::dump_models;
pub use load::{load_all, FixtureLoad, LoadSummary};

/// Quote an identifier taken from the registry for use in SQL text.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
