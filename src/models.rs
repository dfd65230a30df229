use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A named problem set with its declared number of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemSet {
    pub name: String,
    // Absent or null means "no target", same as 0
    #[serde(default)]
    pub amount: Option<i64>,
}

impl ProblemSet {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, amount: i64) -> Self {
        Self {
            name: name.into(),
            amount: Some(amount),
        }
    }

    pub fn amount(&self) -> i64 {
        self.amount.unwrap_or(0)
    }

    /// Rates against this set are only defined with a positive amount.
    pub fn has_target(&self) -> bool {
        self.amount() > 0
    }
}

/// Problem sets in file order. Names are unique; the first entry wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    sets: Vec<ProblemSet>,
}

impl Catalog {
    pub fn new(sets: Vec<ProblemSet>) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(sets.len());
        for set in sets {
            if seen.insert(set.name.clone()) {
                unique.push(set);
            } else {
                tracing::warn!(name = %set.name, "duplicate problem set in catalog, keeping the first");
            }
        }
        Self { sets: unique }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.iter().map(|s| s.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&ProblemSet> {
        self.sets.iter().find(|s| s.name == name)
    }

    pub fn amount(&self, name: &str) -> Option<i64> {
        self.get(name).map(ProblemSet::amount)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }
}

/// One row of the exercise log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub date: NaiveDate,
    pub name: String,
    pub sequence: String,
    pub correct: u32,
    pub incorrect: u32,
}

impl Attempt {
    pub fn new(
        date: NaiveDate,
        name: impl Into<String>,
        sequence: impl Into<String>,
        correct: u32,
        incorrect: u32,
    ) -> Self {
        Self {
            date,
            name: name.into(),
            sequence: sequence.into(),
            correct,
            incorrect,
        }
    }

    /// Identity of the practised item, used for dedup.
    pub fn item_key(&self) -> (&str, &str) {
        (&self.name, &self.sequence)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub label: String,
    pub values: Vec<f64>,
}

/// A date-indexed table of float columns, one value per date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DateTable {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<Column>,
}

impl DateTable {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: Vec::new(),
        }
    }

    pub fn push_column(&mut self, label: impl Into<String>, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.dates.len());
        self.columns.push(Column {
            label: label.into(),
            values,
        });
    }

    pub fn column(&self, label: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.label == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    #[cfg(test)]
    pub fn value(&self, label: &str, date: NaiveDate) -> Option<f64> {
        let idx = self.dates.iter().position(|d| *d == date)?;
        self.column(label).map(|c| c.values[idx])
    }

    pub fn last_value(&self, label: &str) -> Option<f64> {
        self.column(label).and_then(|c| c.values.last().copied())
    }

    #[cfg(test)]
    pub fn row_sum(&self, idx: usize) -> f64 {
        self.columns.iter().map(|c| c.values[idx]).sum()
    }

    /// Largest value across the given columns, 0 when there is none.
    pub fn max_over(&self, labels: &[String]) -> f64 {
        labels
            .iter()
            .filter_map(|l| self.column(l))
            .flat_map(|c| c.values.iter().copied())
            .fold(0.0, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
