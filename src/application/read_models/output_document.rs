//! Output document read model
//!
//! Every command result is reduced to one [`OutputDocument`]: the structured
//! data used by the JSON and YAML formatters, and a tabular projection used
//! by the table formatter.

use serde::Serialize;

/// Column headers plus string cells, rendered as aligned text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Two-column FIELD/VALUE table for single-object views
    pub fn key_value<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::new(&["FIELD", "VALUE"]);
        for (key, value) in pairs {
            table.push_row(vec![key.into(), value.into()]);
        }
        table
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Structured command output with its table projection
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDocument {
    pub data: serde_json::Value,
    pub table: TableView,
}

impl OutputDocument {
    /// Serializes `data` and pairs it with the given table
    ///
    /// # Errors
    /// Returns an error if `data` cannot be represented as JSON
    pub fn new<T: Serialize + ?Sized>(
        data: &T,
        table: TableView,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            data: serde_json::to_value(data)?,
            table,
        })
    }
}
