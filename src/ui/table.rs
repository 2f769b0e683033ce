use tabled::{builder::Builder, settings::Style, Table, Tabled};

use crate::storage::Frame;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Two-column key/value table
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a query result with its own column headers. NULL cells print blank.
pub fn frame_table(frame: &Frame) -> String {
    let mut builder = Builder::default();
    builder.push_record(frame.columns().iter().cloned());
    for row in frame.rows() {
        builder.push_record(row.iter().map(ToString::to_string));
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}
