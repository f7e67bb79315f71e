//! A small relational table with a fixed column set
//!
//! Cells are kept as JSON values. Columns requested but absent from the source records are
//! filled with `null`, so the column set of a table does not depend on the result file.
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table from records
    ///
    /// With `columns` the table has exactly those columns, in that order. Without, the columns
    /// are the union of the record fields in order of first appearance.
    pub fn from_records(records: &[&Map<String, Value>], columns: Option<&[&str]>) -> Table {
        let columns: Vec<String> = match columns {
            Some(columns) => columns.iter().map(|c| c.to_string()).collect(),
            None => {
                let mut columns: Vec<String> = Vec::new();
                for record in records {
                    for key in record.keys() {
                        if !columns.contains(key) {
                            columns.push(key.clone());
                        }
                    }
                }
                columns
            }
        };
        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Table { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Values of one column
    pub fn column(&self, column: &str) -> Option<Vec<&Value>> {
        let index = self.position(column)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Cell at `row` in `column`
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.position(column)?;
        self.rows.get(row).map(|r| &r[index])
    }

    /// Remove columns, names that are not present are ignored
    pub fn drop_columns(mut self, columns: &[&str]) -> Table {
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|i| !columns.contains(&self.columns[*i].as_str()))
            .collect();
        self.columns = keep.iter().map(|i| self.columns[*i].clone()).collect();
        self.rows = self
            .rows
            .into_iter()
            .map(|row| keep.iter().map(|i| row[*i].clone()).collect())
            .collect();
        self
    }

    /// Select and order columns, columns that are not present are filled with `null`
    pub fn reindex(self, columns: &[&str]) -> Table {
        let records = self.to_records();
        let refs: Vec<&Map<String, Value>> = records.iter().collect();
        Table::from_records(&refs, Some(columns))
    }

    pub fn rename_column(mut self, from: &str, to: &str) -> Table {
        if let Some(index) = self.position(from) {
            self.columns[index] = to.to_string();
        }
        self
    }

    /// Keep the rows where `column` holds the string `value`
    pub fn filter_eq(&self, column: &str, value: &str) -> Table {
        let Some(index) = self.position(column) else {
            return Table {
                columns: self.columns.clone(),
                rows: Vec::new(),
            };
        };
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| row[index].as_str() == Some(value))
                .cloned()
                .collect(),
        }
    }

    /// The rows as records keyed by column name
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }
}
