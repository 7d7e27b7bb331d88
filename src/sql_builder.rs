//! SQL builder with parameterized query construction.
//!
//! All user-supplied values go through DuckDB's parameter binding (`?` placeholders),
//! never through string interpolation. Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use ygo_collection::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("user_cards")
//!     .where_eq("user_id", "u1")
//!     .where_like("name", "%dragon%")
//!     .order_by(&["name ASC"])
//!     .limit(48)
//!     .build();
//! assert_eq!(params.len(), 2);
//! ```

use duckdb::types::Value;

/// Convert string-ish and numeric inputs into bindable values.
pub trait IntoParam {
    fn into_param(self) -> Value;
}

impl IntoParam for &str {
    fn into_param(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl IntoParam for String {
    fn into_param(self) -> Value {
        Value::Text(self)
    }
}

impl IntoParam for &String {
    fn into_param(self) -> Value {
        Value::Text(self.clone())
    }
}

impl IntoParam for i64 {
    fn into_param(self) -> Value {
        Value::BigInt(self)
    }
}

impl IntoParam for u32 {
    fn into_param(self) -> Value {
        Value::BigInt(self as i64)
    }
}

impl IntoParam for bool {
    fn into_param(self) -> Value {
        Value::Boolean(self)
    }
}

impl<T: IntoParam> IntoParam for Option<T> {
    fn into_param(self) -> Value {
        self.map_or(Value::Null, IntoParam::into_param)
    }
}

/// Builds parameterized SQL queries safely.
pub struct SqlBuilder {
    select_cols: Vec<String>,
    from_table: String,
    where_clauses: Vec<String>,
    params: Vec<Value>,
    group_by_cols: Vec<String>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
    offset_val: Option<usize>,
}

impl SqlBuilder {
    /// Create a builder targeting the given table.
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            from_table: table.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            group_by_cols: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
            offset_val: None,
        }
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a WHERE condition with `?` placeholders for each param.
    pub fn where_clause(&mut self, condition: &str, params: Vec<Value>) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self.params.extend(params);
        self
    }

    /// Add an equality condition: `{column} = ?`.
    pub fn where_eq(&mut self, column: &str, value: impl IntoParam) -> &mut Self {
        self.where_clauses.push(format!("{} = ?", column));
        self.params.push(value.into_param());
        self
    }

    /// Add a case-insensitive LIKE condition.
    ///
    /// Generates: `LOWER({column}) LIKE LOWER(?)`
    pub fn where_like(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.where_clauses
            .push(format!("LOWER({}) LIKE LOWER(?)", column));
        self.params.push(pattern.into_param());
        self
    }

    /// Add an IN condition. An empty list produces `FALSE`.
    pub fn where_in(&mut self, column: &str, values: &[&str]) -> &mut Self {
        if values.is_empty() {
            self.where_clauses.push("FALSE".to_string());
            return self;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        self.where_clauses
            .push(format!("{} IN ({})", column, placeholders));
        self.params.extend(values.iter().map(|v| v.into_param()));
        self
    }

    /// `{column} >= ?`
    pub fn where_gte(&mut self, column: &str, value: impl IntoParam) -> &mut Self {
        self.where_clauses.push(format!("{} >= ?", column));
        self.params.push(value.into_param());
        self
    }

    /// `{column} <= ?`
    pub fn where_lte(&mut self, column: &str, value: impl IntoParam) -> &mut Self {
        self.where_clauses.push(format!("{} <= ?", column));
        self.params.push(value.into_param());
        self
    }

    /// Match `value` against any of `columns` with a case-insensitive LIKE.
    ///
    /// Generates: `(LOWER(a) LIKE LOWER(?) OR LOWER(b) LIKE LOWER(?))`
    pub fn where_any_like(&mut self, columns: &[&str], pattern: &str) -> &mut Self {
        if columns.is_empty() {
            return self;
        }
        let parts: Vec<String> = columns
            .iter()
            .map(|c| format!("LOWER({}) LIKE LOWER(?)", c))
            .collect();
        self.where_clauses.push(format!("({})", parts.join(" OR ")));
        self.params
            .extend(columns.iter().map(|_| pattern.into_param()));
        self
    }

    pub fn group_by(&mut self, cols: &[&str]) -> &mut Self {
        self.group_by_cols
            .extend(cols.iter().map(|c| c.to_string()));
        self
    }

    /// Add ORDER BY clauses (e.g. `"name ASC"`, `"updated_at DESC"`).
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols
            .extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    pub fn offset(&mut self, n: usize) -> &mut Self {
        self.offset_val = Some(n);
        self
    }

    /// Build the final SQL string and parameter list.
    pub fn build(&self) -> (String, Vec<Value>) {
        let mut parts = vec![
            format!("SELECT {}", self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.group_by_cols.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by_cols.join(", ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }

        if let Some(n) = self.offset_val {
            parts.push(format!("OFFSET {}", n));
        }

        (parts.join("\n"), self.params.clone())
    }
}
