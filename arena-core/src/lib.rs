pub mod error;
pub mod value;
pub mod row;
pub mod schema;
pub mod config;

pub use error::{Error, Result};
pub use value::Scalar;
pub use row::{QueryResult, Record, FilterSet, RowData, UpdateSpec};
pub use schema::ColumnDescriptor;
pub use config::ArenaConfig;
