use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::aggregate::{
    accuracy_label, accuracy_over_time, coverage_label, coverage_over_time, daily_counts,
    known_names,
};
use crate::error::Result;
use crate::loader;
use crate::models::{Attempt, Catalog, DateTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

impl ChartKind {
    /// Counts print whole, percentages with one decimal.
    pub fn format(&self, value: f64) -> String {
        match self {
            ChartKind::Bar => format!("{value:.0}"),
            ChartKind::Line => format!("{value:.1}"),
        }
    }
}

/// What the renderer receives: a table plus the columns to plot.
#[derive(Debug, Clone, Serialize)]
pub struct ChartView {
    pub title: &'static str,
    pub kind: ChartKind,
    pub table: DateTable,
    pub columns: Vec<String>,
    pub show_raw: bool,
}

impl ChartView {
    pub fn has_data(&self) -> bool {
        !self.table.is_empty() && !self.columns.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SetSummary {
    pub name: String,
    pub amount: i64,
    pub attempts: usize,
    pub distinct_items: usize,
    pub coverage: Option<f64>,
    pub accuracy: Option<f64>,
    pub known: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub catalog: PathBuf,
    pub log: PathBuf,
}

impl DataPaths {
    pub const CATALOG_FILE: &'static str = "info.json";
    pub const LOG_FILE: &'static str = "result.csv";

    pub fn in_dir(dir: &Path) -> Self {
        Self {
            catalog: dir.join(Self::CATALOG_FILE),
            log: dir.join(Self::LOG_FILE),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub catalog: Catalog,
    pub attempts: Vec<Attempt>,
    pub daily: ChartView,
    pub coverage: ChartView,
    pub accuracy: ChartView,
}

impl Dashboard {
    /// Loads both files; any failure aborts before anything is built.
    pub fn load(paths: &DataPaths, show_raw: bool) -> Result<Self> {
        let catalog = loader::load_catalog(&paths.catalog)?;
        let attempts = loader::load_log(&paths.log)?;
        Ok(Self::build(catalog, attempts, show_raw))
    }

    pub fn build(catalog: Catalog, attempts: Vec<Attempt>, show_raw: bool) -> Self {
        let names = known_names(&catalog, &attempts);
        debug!(known = names.len(), "building dashboard");

        let daily = ChartView {
            title: "Daily Count",
            kind: ChartKind::Bar,
            table: daily_counts(&attempts),
            columns: names.clone(),
            show_raw,
        };

        let coverage_table = coverage_over_time(&catalog, &attempts);
        let coverage = ChartView {
            title: "Coverage %",
            kind: ChartKind::Line,
            columns: names
                .iter()
                .map(|n| coverage_label(n))
                .filter(|l| coverage_table.column(l).is_some())
                .collect(),
            table: coverage_table,
            show_raw,
        };

        let accuracy = ChartView {
            title: "Accuracy %",
            kind: ChartKind::Line,
            table: accuracy_over_time(&catalog, &attempts),
            columns: names.iter().map(|n| accuracy_label(n)).collect(),
            show_raw,
        };

        Self {
            catalog,
            attempts,
            daily,
            coverage,
            accuracy,
        }
    }

    pub fn views(&self) -> [&ChartView; 3] {
        [&self.daily, &self.coverage, &self.accuracy]
    }

    /// Per-set roll-up in catalog order, followed by log-only names.
    pub fn summaries(&self) -> Vec<SetSummary> {
        let known: HashSet<&str> = self.daily.columns.iter().map(String::as_str).collect();

        let mut names: Vec<&str> = self.catalog.names().collect();
        for label in self.daily.table.labels() {
            if !names.contains(&label) {
                names.push(label);
            }
        }

        names
            .into_iter()
            .map(|name| {
                let rows: Vec<&Attempt> =
                    self.attempts.iter().filter(|a| a.name == name).collect();
                let distinct: HashSet<&str> = rows.iter().map(|a| a.sequence.as_str()).collect();
                SetSummary {
                    name: name.to_string(),
                    amount: self.catalog.amount(name).unwrap_or(0),
                    attempts: rows.len(),
                    distinct_items: distinct.len(),
                    coverage: self.coverage.table.last_value(&coverage_label(name)),
                    accuracy: self.accuracy.table.last_value(&accuracy_label(name)),
                    known: known.contains(name),
                }
            })
            .collect()
    }
}
