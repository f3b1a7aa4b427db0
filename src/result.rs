use serde::Serialize;

use crate::core::{Row, Value};

/// Outcome of one executed statement.
///
/// Queries fill `columns` and `rows`. DML fills `affected_rows`, and an
/// INSERT that filled an identity column reports it in `generated_key`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub affected_rows: Option<usize>,
    pub generated_key: Option<Value>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            ..Self::default()
        }
    }

    pub fn affected(count: usize) -> Self {
        Self {
            affected_rows: Some(count),
            ..Self::default()
        }
    }

    pub fn with_generated_key(mut self, key: Option<Value>) -> Self {
        self.generated_key = key;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn affected_rows(&self) -> usize {
        self.affected_rows.unwrap_or(0)
    }

    /// Renders the rows as an aligned text table.
    pub fn render(&self) -> String {
        if self.columns.is_empty() {
            return match self.affected_rows {
                Some(count) => format!("{} row(s) affected", count),
                None => "Empty result set".to_string(),
            };
        }

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
        for row in &self.rows {
            for (i, value) in row.iter().enumerate() {
                widths[i] = widths[i].max(value.to_string().len());
            }
        }

        let header: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{:width$}", col, width = widths[i]))
            .collect();
        let separator: String = widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-");

        let mut lines = vec![header.join(" | "), separator];
        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, val)| format!("{:width$}", val, width = widths[i]))
                .collect();
            lines.push(cells.join(" | "));
        }
        lines.push(format!("{} row(s)", self.rows.len()));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table() {
        let result = QueryResult::new(
            vec!["id".into(), "name".into()],
            vec![vec![Value::Integer(1), Value::from("alice")]],
        );

        let rendered = result.render();
        assert!(rendered.starts_with("id | name"));
        assert!(rendered.contains("1  | alice"));
        assert!(rendered.ends_with("1 row(s)"));
    }

    #[test]
    fn test_render_affected_rows() {
        assert_eq!(QueryResult::affected(2).render(), "2 row(s) affected");
    }
}
