//! Date-indexed roll-ups of the exercise log.
//!
//! Every table shares the same row axis: the distinct dates present in the
//! log, ascending. Days without any attempt do not appear.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{Attempt, Catalog, DateTable};

pub const COVERAGE_PREFIX: &str = "complete(%):";
pub const ACCURACY_PREFIX: &str = "accuracy(%):";

pub fn coverage_label(name: &str) -> String {
    format!("{COVERAGE_PREFIX}{name}")
}

pub fn accuracy_label(name: &str) -> String {
    format!("{ACCURACY_PREFIX}{name}")
}

pub fn log_dates(attempts: &[Attempt]) -> Vec<NaiveDate> {
    attempts
        .iter()
        .map(|a| a.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Problem sets present in both the catalog and the log, in catalog order.
pub fn known_names(catalog: &Catalog, attempts: &[Attempt]) -> Vec<String> {
    let logged: HashSet<&str> = attempts.iter().map(|a| a.name.as_str()).collect();
    let listed: HashSet<&str> = catalog.names().collect();
    let shared: HashSet<&str> = listed.intersection(&logged).copied().collect();

    for name in logged.difference(&listed) {
        debug!(name, "problem set in log but not in catalog, excluded");
    }
    for name in listed.difference(&logged) {
        debug!(name, "problem set in catalog has no attempts, excluded");
    }

    catalog
        .names()
        .filter(|n| shared.contains(n))
        .map(String::from)
        .collect()
}

// One column per name (ascending) counting rows per date. Rows whose date is
// not on the axis are dropped.
fn tally<'a, I>(dates: Vec<NaiveDate>, rows: I) -> DateTable
where
    I: IntoIterator<Item = (NaiveDate, &'a str)>,
{
    let index: HashMap<NaiveDate, usize> =
        dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

    let mut counts: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (date, name) in rows {
        let Some(&i) = index.get(&date) else {
            continue;
        };
        counts
            .entry(name)
            .or_insert_with(|| vec![0.0; dates.len()])[i] += 1.0;
    }

    let mut table = DateTable::new(dates);
    for (name, values) in counts {
        table.push_column(name, values);
    }
    table
}

/// Number of attempts per date and problem set. Missing pairs are 0.
pub fn daily_counts(attempts: &[Attempt]) -> DateTable {
    tally(
        log_dates(attempts),
        attempts.iter().map(|a| (a.date, a.name.as_str())),
    )
}

/// Earliest date each `(name, sequence)` item was attempted.
pub fn first_seen(attempts: &[Attempt]) -> HashMap<(&str, &str), NaiveDate> {
    let mut seen: HashMap<(&str, &str), NaiveDate> = HashMap::new();
    for attempt in attempts {
        seen.entry(attempt.item_key())
            .and_modify(|d| *d = (*d).min(attempt.date))
            .or_insert(attempt.date);
    }
    seen
}

/// Cumulative percentage of distinct items attempted per problem set.
///
/// Only sets known to both inputs with a positive amount get a column. Dates
/// with attempts but no new items carry the previous value forward. Values are
/// not clamped, so a log with more items than the declared amount exceeds 100.
pub fn coverage_over_time(catalog: &Catalog, attempts: &[Attempt]) -> DateTable {
    let dates = log_dates(attempts);
    let firsts = first_seen(attempts);
    let new_items = tally(
        dates.clone(),
        firsts.iter().map(|(&(name, _), &date)| (date, name)),
    );

    let mut table = DateTable::new(dates);
    for name in known_names(catalog, attempts) {
        let Some(set) = catalog.get(&name).filter(|s| s.has_target()) else {
            debug!(name = %name, "no target amount, coverage skipped");
            continue;
        };
        let amount = set.amount() as f64;
        let Some(column) = new_items.column(&name) else {
            continue;
        };

        let mut running = 0.0;
        let values = column
            .values
            .iter()
            .map(|n| {
                running += n;
                running / amount * 100.0
            })
            .collect();
        table.push_column(coverage_label(&name), values);
    }
    table
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    correct: u64,
    incorrect: u64,
}

impl Tally {
    fn percent(&self) -> f64 {
        let graded = self.correct + self.incorrect;
        if graded == 0 {
            0.0
        } else {
            self.correct as f64 / graded as f64 * 100.0
        }
    }
}

/// Percent correct per problem set as of each date, counting only the latest
/// outcome of every item up to that date.
///
/// Attempts are folded in date order into a map of latest outcome per item;
/// on the same date a later log row supersedes an earlier one. Sets without
/// graded attempts yet report 0.
pub fn accuracy_over_time(catalog: &Catalog, attempts: &[Attempt]) -> DateTable {
    let names = known_names(catalog, attempts);
    let dates = log_dates(attempts);

    let mut ordered: Vec<&Attempt> = attempts.iter().collect();
    ordered.sort_by_key(|a| a.date);

    let mut latest: HashMap<(&str, &str), Tally> = HashMap::new();
    let mut series: Vec<Vec<f64>> = vec![Vec::with_capacity(dates.len()); names.len()];
    let mut pos = 0;

    for cutoff in &dates {
        while let Some(attempt) = ordered.get(pos).filter(|a| a.date <= *cutoff) {
            latest.insert(
                attempt.item_key(),
                Tally {
                    correct: attempt.correct.into(),
                    incorrect: attempt.incorrect.into(),
                },
            );
            pos += 1;
        }

        let mut per_name: HashMap<&str, Tally> = HashMap::new();
        for (&(name, _), outcome) in &latest {
            let total = per_name.entry(name).or_default();
            total.correct += outcome.correct;
            total.incorrect += outcome.incorrect;
        }

        for (name, values) in names.iter().zip(series.iter_mut()) {
            let pct = per_name
                .get(name.as_str())
                .map(Tally::percent)
                .unwrap_or(0.0);
            values.push(pct);
        }
    }

    let mut table = DateTable::new(dates);
    for (name, values) in names.iter().zip(series) {
        table.push_column(accuracy_label(name), values);
    }
    table
}
