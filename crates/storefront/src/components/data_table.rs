//! Data table component types.
//!
//! These types describe the admin list tables: which columns exist, which can
//! be sorted, which filters are offered, and the per-row actions. Routes turn
//! backend records into [`AdminRow`]s and render them through one shared
//! table template.

use papergift_core::OrderStatus;

use super::list_query::{ListQuery, Pagination, SortDirection};
use crate::api::PageMeta;

/// Column definition for a data table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    /// Key sent to the backend as `sort` when the column is sortable.
    pub key: String,
    /// Display label for the column header.
    pub label: String,
    /// Whether the column is sortable.
    pub sortable: bool,
}

impl TableColumn {
    /// Create a new sortable column.
    #[must_use]
    pub fn sortable(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            sortable: true,
        }
    }

    /// Create a new non-sortable column.
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            sortable: false,
        }
    }
}

/// Filter type for data tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    /// Text input filter.
    Text,
    /// Single-select dropdown.
    Select,
}

/// Filter definition for a data table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFilter {
    /// Query parameter key (`status` is the only select the backend takes).
    pub key: String,
    /// Display label.
    pub label: String,
    /// Filter type.
    pub filter_type: FilterType,
    /// Available options (for selects).
    pub options: Vec<FilterOption>,
}

/// Option for select filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    /// Option value.
    pub value: String,
    /// Display label.
    pub label: String,
}

impl FilterOption {
    /// Create a new filter option.
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

impl TableFilter {
    /// Create a select filter.
    #[must_use]
    pub fn select(key: &str, label: &str, options: Vec<FilterOption>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Select,
            options,
        }
    }

    #[must_use]
    pub const fn is_select(&self) -> bool {
        matches!(self.filter_type, FilterType::Select)
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTableConfig {
    /// Unique table identifier.
    pub table_id: String,
    /// Page heading.
    pub title: String,
    /// Column definitions.
    pub columns: Vec<TableColumn>,
    /// Filter definitions.
    pub filters: Vec<TableFilter>,
    /// Whether to show the search box.
    pub searchable: bool,
    /// Search placeholder text.
    pub search_placeholder: String,
    /// Title for empty state.
    pub empty_title: String,
    /// Description for empty state.
    pub empty_description: Option<String>,
    /// Row actions post over HTMX and swap the table in place.
    pub live: bool,
}

impl DataTableConfig {
    /// Create a new data table configuration.
    #[must_use]
    pub fn new(table_id: &str, title: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            title: title.to_string(),
            columns: vec![],
            filters: vec![],
            searchable: false,
            search_placeholder: "Search...".to_string(),
            empty_title: "No items found".to_string(),
            empty_description: None,
            live: false,
        }
    }

    /// Add a column.
    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(mut self, filter: TableFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Enable the search box with the given placeholder.
    #[must_use]
    pub fn search_placeholder(mut self, placeholder: &str) -> Self {
        self.searchable = true;
        self.search_placeholder = placeholder.to_string();
        self
    }

    /// Set empty state configuration.
    #[must_use]
    pub fn empty_state(mut self, title: &str, description: Option<&str>) -> Self {
        self.empty_title = title.to_string();
        self.empty_description = description.map(ToString::to_string);
        self
    }

    /// Swap the table in place after row actions instead of reloading.
    #[must_use]
    pub const fn live(mut self) -> Self {
        self.live = true;
        self
    }

    #[must_use]
    pub fn has_filters(&self) -> bool {
        self.searchable || !self.filters.is_empty()
    }
}

// =============================================================================
// Rows
// =============================================================================

/// A form button rendered in a row's action cell.
///
/// Each action is a small `POST` form; `fields` become hidden inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAction {
    pub label: String,
    pub action_url: String,
    pub fields: Vec<(String, String)>,
    /// Browser confirmation prompt (`hx-confirm`).
    pub confirm: Option<String>,
    pub destructive: bool,
}

impl RowAction {
    #[must_use]
    pub fn new(label: &str, action_url: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            action_url: action_url.into(),
            fields: vec![],
            confirm: None,
            destructive: false,
        }
    }

    /// Add a hidden form field.
    #[must_use]
    pub fn field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    /// Mark this action as destructive and ask for confirmation.
    #[must_use]
    pub fn destructive(mut self, confirm: &str) -> Self {
        self.destructive = true;
        self.confirm = Some(confirm.to_string());
        self
    }
}

/// One rendered row: pre-formatted cells in column order, plus actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRow {
    pub id: String,
    pub cells: Vec<String>,
    pub actions: Vec<RowAction>,
    /// Highlighted (e.g. the order a notification pointed at).
    pub highlighted: bool,
}

impl AdminRow {
    #[must_use]
    pub fn new(id: impl ToString, cells: Vec<String>) -> Self {
        Self {
            id: id.to_string(),
            cells,
            actions: vec![],
            highlighted: false,
        }
    }

    #[must_use]
    pub fn action(mut self, action: RowAction) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub const fn highlighted(mut self, highlighted: bool) -> Self {
        self.highlighted = highlighted;
        self
    }
}

/// Column header with its sort link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeader {
    pub label: String,
    pub sort_url: Option<String>,
    /// Direction when the table is currently sorted by this column.
    pub sorted: Option<SortDirection>,
}

impl ColumnHeader {
    /// Arrow shown next to the active sort column.
    #[must_use]
    pub const fn indicator(&self) -> &'static str {
        match self.sorted {
            Some(SortDirection::Asc) => "▲",
            Some(SortDirection::Desc) => "▼",
            None => "",
        }
    }
}

/// Everything the shared admin table template needs.
#[derive(Debug, Clone)]
pub struct AdminTable {
    pub config: DataTableConfig,
    pub base_path: String,
    pub headers: Vec<ColumnHeader>,
    pub rows: Vec<AdminRow>,
    pub pagination: Pagination,
    pub search: String,
    pub status: String,
    /// Query string of the page being shown, for live row actions.
    pub query_string: String,
    /// Whether any row has actions (adds the actions column).
    pub has_actions: bool,
}

impl AdminTable {
    #[must_use]
    pub fn new(
        config: DataTableConfig,
        base_path: &str,
        query: &ListQuery,
        rows: Vec<AdminRow>,
        meta: &PageMeta,
    ) -> Self {
        let headers = config
            .columns
            .iter()
            .map(|column| ColumnHeader {
                label: column.label.clone(),
                sort_url: column
                    .sortable
                    .then(|| query.sort_url(base_path, &column.key)),
                sorted: (query.sort.as_deref() == Some(column.key.as_str()))
                    .then(|| query.direction()),
            })
            .collect();

        Self {
            has_actions: rows.iter().any(|r| !r.actions.is_empty()),
            pagination: query.pagination(base_path, meta),
            search: query.search.clone().unwrap_or_default(),
            status: query.status.clone().unwrap_or_default(),
            query_string: query.query_string(),
            base_path: base_path.to_string(),
            config,
            headers,
            rows,
        }
    }
}

// =============================================================================
// Table configurations
// =============================================================================

/// Build the products table configuration.
#[must_use]
pub fn products_table_config() -> DataTableConfig {
    DataTableConfig::new("products", "Products")
        .column(TableColumn::sortable("name", "Name"))
        .column(TableColumn::new("category", "Category"))
        .column(TableColumn::sortable("price", "Price"))
        .column(TableColumn::sortable("stock", "Stock"))
        .column(TableColumn::new("active", "Active"))
        .search_placeholder("Search products by name...")
        .empty_state(
            "No products found",
            Some("Try adjusting your search or add a product"),
        )
}

/// Build the orders table configuration.
#[must_use]
pub fn orders_table_config() -> DataTableConfig {
    DataTableConfig::new("orders", "Orders")
        .column(TableColumn::sortable("orderNumber", "Order"))
        .column(TableColumn::new("customer", "Customer"))
        .column(TableColumn::sortable("status", "Status"))
        .column(TableColumn::new("payment", "Payment"))
        .column(TableColumn::sortable("total", "Total"))
        .column(TableColumn::sortable("createdAt", "Placed"))
        .filter(TableFilter::select(
            "status",
            "Status",
            OrderStatus::ALL
                .iter()
                .map(|s| FilterOption::new(s.as_str(), s.label()))
                .collect(),
        ))
        .search_placeholder("Search by order number or customer...")
        .empty_state("No orders found", Some("Try adjusting your search or filters"))
}

/// Build the carts table configuration.
#[must_use]
pub fn carts_table_config() -> DataTableConfig {
    DataTableConfig::new("carts", "Carts")
        .column(TableColumn::new("customer", "Customer"))
        .column(TableColumn::new("items", "Items"))
        .column(TableColumn::sortable("subtotal", "Subtotal"))
        .column(TableColumn::sortable("updatedAt", "Updated"))
        .empty_state("No active carts", None)
}

/// Build the coupons table configuration.
#[must_use]
pub fn coupons_table_config() -> DataTableConfig {
    DataTableConfig::new("coupons", "Coupons")
        .column(TableColumn::sortable("code", "Code"))
        .column(TableColumn::new("discount", "Discount"))
        .column(TableColumn::new("minOrder", "Min. order"))
        .column(TableColumn::sortable("usedCount", "Used"))
        .column(TableColumn::sortable("expiresAt", "Expires"))
        .column(TableColumn::new("active", "Active"))
        .search_placeholder("Search coupon codes...")
        .empty_state("No coupons yet", None)
}

/// Build the promotions table configuration.
#[must_use]
pub fn promotions_table_config() -> DataTableConfig {
    DataTableConfig::new("promotions", "Promotions")
        .column(TableColumn::sortable("name", "Name"))
        .column(TableColumn::new("discount", "Discount"))
        .column(TableColumn::sortable("startsAt", "Starts"))
        .column(TableColumn::sortable("endsAt", "Ends"))
        .column(TableColumn::new("active", "Active"))
        .filter(TableFilter::select(
            "status",
            "Status",
            vec![
                FilterOption::new("active", "Active"),
                FilterOption::new("inactive", "Inactive"),
            ],
        ))
        .empty_state("No promotions yet", None)
}

/// Build the reviews table configuration.
#[must_use]
pub fn reviews_table_config() -> DataTableConfig {
    DataTableConfig::new("reviews", "Reviews")
        .column(TableColumn::new("product", "Product"))
        .column(TableColumn::new("author", "Author"))
        .column(TableColumn::sortable("rating", "Rating"))
        .column(TableColumn::new("comment", "Comment"))
        .column(TableColumn::new("approved", "Approved"))
        .column(TableColumn::sortable("createdAt", "Posted"))
        .filter(TableFilter::select(
            "status",
            "Status",
            vec![
                FilterOption::new("pending", "Pending"),
                FilterOption::new("approved", "Approved"),
            ],
        ))
        .empty_state("No reviews to moderate", None)
        .live()
}

/// Build the payment methods table configuration.
#[must_use]
pub fn payment_methods_table_config() -> DataTableConfig {
    DataTableConfig::new("payment-methods", "Payment methods")
        .column(TableColumn::new("code", "Code"))
        .column(TableColumn::new("name", "Name"))
        .column(TableColumn::new("description", "Description"))
        .column(TableColumn::new("active", "Active"))
        .empty_state("No payment methods configured", None)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_follow_sort_state() {
        let query = ListQuery {
            sort: Some("total".to_string()),
            direction: Some(SortDirection::Desc),
            ..ListQuery::default()
        };
        let table = AdminTable::new(
            orders_table_config(),
            "/admin/orders",
            &query,
            vec![],
            &PageMeta::default(),
        );

        let total = table.headers.iter().find(|h| h.label == "Total").unwrap();
        assert_eq!(total.sorted, Some(SortDirection::Desc));
        assert_eq!(total.indicator(), "▼");
        assert_eq!(
            total.sort_url.as_deref(),
            Some("/admin/orders?sort=total&direction=asc")
        );

        let customer = table.headers.iter().find(|h| h.label == "Customer").unwrap();
        assert!(customer.sort_url.is_none());
        assert!(!table.has_actions);
    }

    #[test]
    fn test_order_status_filter_lists_every_status() {
        let config = orders_table_config();
        let status = config.filters.first().unwrap();
        assert!(status.is_select());
        assert_eq!(status.options.len(), OrderStatus::ALL.len());
        assert!(config.has_filters());
        assert!(!payment_methods_table_config().has_filters());
    }

    #[test]
    fn test_row_actions() {
        let row = AdminRow::new(7, vec!["#7".to_string()])
            .action(RowAction::new("Delete", "/admin/coupons/7/delete").destructive("Delete?"))
            .highlighted(true);

        assert_eq!(row.id, "7");
        assert!(row.highlighted);
        let action = row.actions.first().unwrap();
        assert!(action.destructive);
        assert_eq!(action.confirm.as_deref(), Some("Delete?"));
    }
}
