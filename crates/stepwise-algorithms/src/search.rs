//! Array searches.
//!
//! Binary search assumes its input is sorted. That is the caller's contract;
//! the generator does not check it and its log is only meaningful when the
//! precondition holds.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use stepwise_trace::{AlgorithmFamily, Baseline, LogBuilder, Step, Tag, Target};

use crate::Run;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    Linear,
    Binary,
}

/// Run the chosen search for `key`.
pub fn search(method: SearchMethod, values: &[i64], key: i64) -> Run<Option<usize>> {
    match method {
        SearchMethod::Linear => linear_search(values, key),
        SearchMethod::Binary => binary_search(values, key),
    }
}

fn builder(values: &[i64]) -> LogBuilder {
    LogBuilder::new(
        AlgorithmFamily::Search,
        Baseline::Array {
            values: values.to_vec(),
        },
    )
}

fn finish(mut log: LogBuilder, key: i64, found: Option<usize>) -> Run<Option<usize>> {
    match found {
        Some(index) => log.push(
            Step::highlight([Target::Element(index)], format!("Found {key} at index {index}"))
                .with_tag(Tag::Found),
        ),
        None => log.push(Step::note(format!("{key} not found"))),
    }
    Run {
        log: log.finish(),
        output: found,
    }
}

/// Scan left to right, one compare per element.
pub fn linear_search(values: &[i64], key: i64) -> Run<Option<usize>> {
    let mut log = builder(values);

    for (index, &value) in values.iter().enumerate() {
        log.push(Step::compare(
            [Target::Element(index)],
            format!("Compare {value} with {key}"),
        ));
        if value == key {
            return finish(log, key, Some(index));
        }
    }
    finish(log, key, None)
}

/// Halve the search window each probe. `values` must be sorted ascending.
pub fn binary_search(values: &[i64], key: i64) -> Run<Option<usize>> {
    let mut log = builder(values);
    let (mut lo, mut hi) = (0, values.len());

    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let value = values[mid];
        let ordering = key.cmp(&value);
        let direction = match ordering {
            Ordering::Equal => "match",
            Ordering::Less => "search left half",
            Ordering::Greater => "search right half",
        };
        log.push(Step::compare(
            [Target::Element(mid)],
            format!("Compare {key} with {value} at index {mid}: {direction}"),
        ));

        match ordering {
            Ordering::Equal => return finish(log, key, Some(mid)),
            Ordering::Less => hi = mid,
            Ordering::Greater => lo = mid + 1,
        }
    }
    finish(log, key, None)
}
