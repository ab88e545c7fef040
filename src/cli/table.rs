//! Table output for list commands
//!
//! Every list command builds `TableRow`s of typed cells and hands them to a
//! `TableFormatter`, which renders TSV (colored on a terminal), CSV,
//! Markdown or bare ids. JSON and YAML are serialized by the commands
//! themselves from the underlying records.

use chrono::NaiveDateTime;
use console::style;
use std::fmt::Write;

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;
use crate::entities::OrderStatus;

const MISSING: &str = "-";

#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Print "N client(s) found." under TSV tables
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { show_summary: true }
    }
}

impl TableConfig {
    /// No trailing count, for tables embedded in other output
    pub fn for_pipe() -> Self {
        Self {
            show_summary: false,
        }
    }
}

/// One table cell; the variant decides alignment and coloring
#[derive(Debug, Clone)]
pub enum CellValue {
    Id(i64),
    /// Truncated to the column width
    Text(String),
    /// Two decimals, right aligned
    Money(f64),
    Status(OrderStatus),
    Number(i64),
    /// Quantity on hand and the low-stock threshold
    Stock(i64, i64),
    DateTime(NaiveDateTime),
    Empty,
}

impl CellValue {
    pub fn opt_text(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => CellValue::Text(v.to_string()),
            _ => CellValue::Empty,
        }
    }

    /// Padded to `width`, styled when stdout is a terminal
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => format!("{:<width$}", style(id).cyan()),
            CellValue::Text(text) => {
                format!("{:<width$}", truncate_str(text, width.saturating_sub(2)))
            }
            CellValue::Money(amount) => format!("{:>width$.2}", amount),
            CellValue::Status(status) => {
                let label = style(status.label());
                let label = match status {
                    OrderStatus::New => label.white(),
                    OrderStatus::InProgress => label.yellow(),
                    OrderStatus::Ready => label.green().bold(),
                    OrderStatus::Delivered => label.dim(),
                };
                format!("{:<width$}", label)
            }
            CellValue::Number(n) => format!("{:>width$}", n),
            CellValue::Stock(quantity, threshold) => {
                let shown = style(quantity.to_string());
                let shown = if quantity <= threshold {
                    shown.red().bold()
                } else {
                    shown.white()
                };
                format!("{:>width$}", shown)
            }
            CellValue::DateTime(at) => format!("{:<width$}", at.format("%Y-%m-%d %H:%M").to_string()),
            CellValue::Empty => format!("{:<width$}", MISSING),
        }
    }

    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Text(text) => escape_csv(text),
            CellValue::DateTime(at) => at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            other => other.raw(),
        }
    }

    /// Human labels; pipes escaped so they don't split the row
    pub fn format_md(&self) -> String {
        let text = match self {
            CellValue::Empty => MISSING.to_string(),
            CellValue::Status(status) => status.label().to_string(),
            other => other.raw(),
        };
        text.replace('|', "\\|")
    }

    /// Unstyled value; statuses use their stored token
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(n) | CellValue::Number(n) | CellValue::Stock(n, _) => n.to_string(),
            CellValue::Text(text) => text.clone(),
            CellValue::Money(amount) => format!("{:.2}", amount),
            CellValue::Status(status) => status.as_str().to_string(),
            CellValue::DateTime(at) => at.format("%Y-%m-%d %H:%M").to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Characters needed to show the value untruncated
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Status(status) => status.label().chars().count(),
            CellValue::Empty => MISSING.len(),
            other => other.raw().chars().count(),
        }
    }
}

/// A column: row key, header text and the width it may grow to
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

pub struct TableRow {
    pub id: i64,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find_map(|(k, value)| (*k == key).then_some(value))
    }
}

pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    config: TableConfig,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            config: TableConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Render and print to stdout
    pub fn output<I>(&self, rows: I, format: OutputFormat)
    where
        I: IntoIterator<Item = TableRow>,
    {
        let rows: Vec<TableRow> = rows.into_iter().collect();
        print!("{}", self.render(&rows, format));
    }

    /// Tables for json/yaml/auto fall back to TSV
    pub fn render(&self, rows: &[TableRow], format: OutputFormat) -> String {
        match format {
            OutputFormat::Csv => self.render_csv(rows),
            OutputFormat::Md => self.render_md(rows),
            OutputFormat::Id => rows.iter().map(|row| format!("{}\n", row.id)).collect(),
            _ => self.render_tsv(rows),
        }
    }

    /// Each column is as wide as its header or widest value (plus room for
    /// the truncation marker), capped at the column's width
    fn widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let widest = rows
                    .iter()
                    .filter_map(|row| row.get(col.key))
                    .map(CellValue::display_width)
                    .max()
                    .unwrap_or(0);
                col.header.len().max(widest + 2).min(col.width)
            })
            .collect()
    }

    fn render_tsv(&self, rows: &[TableRow]) -> String {
        let widths = self.widths(rows);
        let mut out = String::new();

        let header = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, &width)| format!("{:<width$}", style(col.header).bold()))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "{}", header.trim_end());
        let rule = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        let _ = writeln!(out, "{}", "-".repeat(rule));

        for row in rows {
            let line = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(col, &width)| match row.get(col.key) {
                    Some(value) => value.format_tsv(width),
                    None => format!("{:<width$}", MISSING),
                })
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(out, "{}", line.trim_end());
        }

        if self.config.show_summary {
            let _ = write!(
                out,
                "\n{} {}(s) found.\n",
                style(rows.len()).cyan(),
                self.entity_name
            );
        }
        out
    }

    fn render_csv(&self, rows: &[TableRow]) -> String {
        let keys: Vec<&str> = self.columns.iter().map(|col| col.key).collect();
        let mut out = format!("{}\n", keys.join(","));
        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| row.get(col.key).map(CellValue::format_csv).unwrap_or_default())
                .collect();
            let _ = writeln!(out, "{}", values.join(","));
        }
        out
    }

    fn render_md(&self, rows: &[TableRow]) -> String {
        let headers: Vec<&str> = self.columns.iter().map(|col| col.header).collect();
        let mut out = format!("| {} |\n", headers.join(" | "));
        let _ = writeln!(out, "|{}|", vec!["---"; headers.len()].join("|"));
        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| {
                    row.get(col.key)
                        .map(CellValue::format_md)
                        .unwrap_or_else(|| MISSING.to_string())
                })
                .collect();
            let _ = writeln!(out, "| {} |", values.join(" | "));
        }
        out
    }
}
