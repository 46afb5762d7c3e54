use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, FilterOrderInfo, SqlResult};

/// Builds one parameterized SELECT from declarative filter data. Table,
/// column and sort identifiers are validated; every value becomes a
/// positional parameter.
pub struct Filter {
    table_name: String,
    select_columns: Vec<String>,
    where_data: Option<Value>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i32>,
    offset: Option<i32>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            select_columns: vec![],
            where_data: None,
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(select) = data.select {
            self.select(select)?;
        }
        if let Some(where_clause) = data.where_clause {
            self.where_clause(where_clause)?;
        }
        if let Some(order) = data.order {
            self.order(order)?;
        }
        if let Some(limit) = data.limit {
            self.limit(limit, data.offset)?;
        }
        Ok(self)
    }

    pub fn select(&mut self, columns: Vec<String>) -> Result<&mut Self, FilterError> {
        Self::validate_select_columns(&columns)?;
        self.select_columns = columns;
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(&conditions)?;
        self.where_data = Some(conditions);
        Ok(self)
    }

    pub fn order(&mut self, order_spec: Value) -> Result<&mut Self, FilterError> {
        let order_info = FilterOrder::validate_and_parse(&order_spec)?;
        for info in &order_info {
            Self::validate_identifier(&info.column)
                .map_err(|_| FilterError::InvalidColumn(info.column.clone()))?;
        }
        self.order_data = order_info;
        Ok(self)
    }

    pub fn limit(&mut self, limit: i32, offset: Option<i32>) -> Result<&mut Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit(
                "Limit must be non-negative".to_string(),
            ));
        }
        if let Some(off) = offset {
            if off < 0 {
                return Err(FilterError::InvalidOffset(
                    "Offset must be non-negative".to_string(),
                ));
            }
        }
        self.limit = Some(limit);
        self.offset = offset;
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let select_clause = self.build_select_clause();
        let (where_clause, params) = if let Some(ref where_data) = self.where_data {
            FilterWhere::generate(where_data)?
        } else {
            (String::new(), vec![])
        };
        let order_clause = FilterOrder::generate(&self.order_data)?;
        let limit_clause = self.build_limit_clause();

        let query = [
            format!("SELECT {}", select_clause),
            format!("FROM \"{}\"", self.table_name),
            if where_clause.is_empty() {
                String::new()
            } else {
                format!("WHERE {}", where_clause)
            },
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        Self::validate_identifier(name)
            .map_err(|_| FilterError::InvalidTableName(format!("Invalid table name format: {}", name)))
    }

    fn validate_select_columns(columns: &[String]) -> Result<(), FilterError> {
        for column in columns {
            if column == "*" {
                continue;
            }
            Self::validate_identifier(column)
                .map_err(|_| FilterError::InvalidColumn(format!("Invalid column name format: {}", column)))?;
        }
        Ok(())
    }

    fn validate_identifier(name: &str) -> Result<(), ()> {
        let mut chars = name.chars();
        match chars.next() {
            Some(first)
                if (first.is_ascii_alphabetic() || first == '_')
                    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') =>
            {
                Ok(())
            }
            _ => Err(()),
        }
    }

    fn build_select_clause(&self) -> String {
        if self.select_columns.is_empty() || self.select_columns.contains(&"*".to_string()) {
            "*".to_string()
        } else {
            self.select_columns
                .iter()
                .map(|c| format!("\"{}\"", c))
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_select() {
        let filter = Filter::new("products").unwrap();
        let sql = filter.to_sql().unwrap();
        assert_eq!(sql.query, "SELECT * FROM \"products\"");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn full_query_shape() {
        let mut filter = Filter::new("products").unwrap();
        filter
            .assign(FilterData {
                select: Some(vec!["id".to_string(), "name".to_string(), "price".to_string()]),
                where_clause: Some(json!({ "price": { "$between": [10, 50] } })),
                order: Some(json!({ "price": "desc" })),
                limit: Some(100),
                offset: Some(20),
            })
            .unwrap();
        let sql = filter.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT \"id\", \"name\", \"price\" FROM \"products\" \
             WHERE \"price\" BETWEEN $1 AND $2 ORDER BY \"price\" DESC LIMIT 100 OFFSET 20"
        );
        assert_eq!(sql.params, vec![json!(10), json!(50)]);
    }

    #[test]
    fn rejects_invalid_table() {
        assert!(Filter::new("products; DROP TABLE users").is_err());
        assert!(Filter::new("").is_err());
    }

    #[test]
    fn rejects_invalid_sort_column() {
        let mut filter = Filter::new("products").unwrap();
        assert!(filter.order(json!({ "price\" --": "asc" })).is_err());
    }

    #[test]
    fn rejects_negative_limit_and_offset() {
        let mut filter = Filter::new("products").unwrap();
        assert!(filter.limit(-1, None).is_err());
        assert!(filter.limit(10, Some(-5)).is_err());
    }
}
