pub mod database;
pub mod executor;
pub mod introspect;
pub mod store;
pub mod reports;
pub mod script;

pub use database::Database;
pub use store::{SqliteTableStore, TableStore};
pub use reports::Reports;
