//! Reusable view components.
//!
//! - `data_table` - Column/filter/action configuration for admin tables
//! - `list_query` - Query-string paging, filtering and sorting state

pub mod data_table;
pub mod list_query;

pub use data_table::{AdminRow, AdminTable, DataTableConfig, RowAction};
pub use list_query::{ListQuery, Pagination, SortDirection};
