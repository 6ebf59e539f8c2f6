pub mod plan;
pub mod builder;
pub mod mapper;

pub use plan::{Placeholder, StatementPlan};
pub use builder::{
    build_delete, build_insert, build_select, build_update, QueryBuilder, NEW_PREFIX, OLD_PREFIX,
};
pub use mapper::{to_named_records, to_tabular};
