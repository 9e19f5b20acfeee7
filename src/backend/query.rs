//! Read Query Builder
//!
//! Describes a single row-level read: a table, a fixed column list
//! (optionally embedding one related table), equality filters, ordering and
//! a row limit. Rendered as REST query parameters:
//!
//! ```text
//! select=id,name,main_job_site:job_sites(id,name)&id=eq.42&order=name.asc&limit=1
//! ```

use std::fmt;

/// A read query against one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    table: String,
    columns: Vec<String>,
    filters: Vec<(String, String)>,
    order: Vec<Order>,
    limit: Option<usize>,
}

/// Ordering on one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.ascending { "asc" } else { "desc" };
        write!(f, "{}.{}", self.column, direction)
    }
}

impl Select {
    /// Start a query on `table` selecting every column
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Restrict the selected columns
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    /// Embed columns of a related table, optionally under an alias
    pub fn embed(mut self, alias: Option<&str>, table: &str, columns: &[&str]) -> Self {
        let inner = columns.join(",");
        let column = match alias {
            Some(alias) => format!("{}:{}({})", alias, table, inner),
            None => format!("{}({})", table, inner),
        };
        self.columns.push(column);
        self
    }

    /// Keep rows where `column` equals `value`
    pub fn eq(mut self, column: &str, value: impl fmt::Display) -> Self {
        self.filters.push((column.to_string(), format!("eq.{}", value)));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// The `select` parameter value
    pub fn select_clause(&self) -> String {
        if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(",")
        }
    }

    /// Query parameters in request order
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.select_clause())];

        params.extend(self.filters.iter().cloned());

        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(Order::to_string)
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }

    /// Render as a URL query string. Filter values are percent-encoded.
    pub fn to_query_string(&self) -> String {
        self.params()
            .into_iter()
            .map(|(key, value)| {
                if key == "select" || key == "order" || key == "limit" {
                    format!("{}={}", key, value)
                } else {
                    format!("{}={}", urlencoding::encode(&key), urlencoding::encode(&value))
                }
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}
