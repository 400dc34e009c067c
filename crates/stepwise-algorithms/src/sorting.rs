//! Comparison sorts.
//!
//! Each sort records one `compare` step per element comparison and one
//! `swap` step per data movement, in the order the algorithm touches
//! memory. Stable sorts only move on a strict `>`, so equal keys keep their
//! relative order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use stepwise_trace::{AlgorithmFamily, Baseline, LogBuilder, Step, Tag, Target};

use crate::Run;

/// The sorting algorithms in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortAlgorithm {
    Bubble,
    Selection,
    Insertion,
    Merge,
    Quick,
    Heap,
}

impl SortAlgorithm {
    pub const ALL: [SortAlgorithm; 6] = [
        SortAlgorithm::Bubble,
        SortAlgorithm::Selection,
        SortAlgorithm::Insertion,
        SortAlgorithm::Merge,
        SortAlgorithm::Quick,
        SortAlgorithm::Heap,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SortAlgorithm::Bubble => "bubble sort",
            SortAlgorithm::Selection => "selection sort",
            SortAlgorithm::Insertion => "insertion sort",
            SortAlgorithm::Merge => "merge sort",
            SortAlgorithm::Quick => "quick sort",
            SortAlgorithm::Heap => "heap sort",
        }
    }

    /// Whether equal keys keep their relative order.
    pub fn is_stable(self) -> bool {
        matches!(
            self,
            SortAlgorithm::Bubble | SortAlgorithm::Insertion | SortAlgorithm::Merge
        )
    }
}

/// Sort `values`, recording every comparison and movement.
pub fn sort(algorithm: SortAlgorithm, values: &[i64]) -> Run<Vec<i64>> {
    let mut sorter = Sorter::new(values);

    match algorithm {
        SortAlgorithm::Bubble => sorter.bubble(),
        SortAlgorithm::Selection => sorter.selection(),
        SortAlgorithm::Insertion => sorter.insertion(),
        SortAlgorithm::Merge => sorter.merge_sort(0, values.len()),
        SortAlgorithm::Quick => sorter.quick(),
        SortAlgorithm::Heap => sorter.heap(),
    }

    let run = sorter.finish();
    tracing::debug!(
        algorithm = algorithm.name(),
        len = values.len(),
        steps = run.log.len(),
        "sort recorded"
    );
    run
}

/// Working copy of the array plus the log being recorded.
struct Sorter {
    data: Vec<i64>,
    sorted: Vec<bool>,
    log: LogBuilder,
}

impl Sorter {
    fn new(values: &[i64]) -> Self {
        Self {
            data: values.to_vec(),
            sorted: vec![false; values.len()],
            log: LogBuilder::new(
                AlgorithmFamily::Sort,
                Baseline::Array {
                    values: values.to_vec(),
                },
            ),
        }
    }

    fn compare(&mut self, i: usize, j: usize) -> Ordering {
        let (a, b) = (self.data[i], self.data[j]);
        self.log.push(Step::compare(
            [Target::Element(i), Target::Element(j)],
            format!("Compare {a} and {b}"),
        ));
        a.cmp(&b)
    }

    fn swap(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        let (a, b) = (self.data[i], self.data[j]);
        self.data.swap(i, j);
        self.log.push(Step::swap(i, j, format!("Swap {a} and {b}")));
    }

    fn mark_sorted(&mut self, indices: impl IntoIterator<Item = usize>) {
        let fresh: Vec<usize> = indices
            .into_iter()
            .filter(|&i| !std::mem::replace(&mut self.sorted[i], true))
            .collect();
        if fresh.is_empty() {
            return;
        }

        let description = match fresh.as_slice() {
            [only] => format!("{} is in its final position", self.data[*only]),
            _ => "Remaining elements are in their final positions".to_string(),
        };
        self.log.push(
            Step::highlight(fresh.into_iter().map(Target::Element), description)
                .with_tag(Tag::Sorted),
        );
    }

    fn finish(mut self) -> Run<Vec<i64>> {
        self.mark_sorted(0..self.data.len());
        Run {
            log: self.log.finish(),
            output: self.data,
        }
    }

    fn bubble(&mut self) {
        let n = self.data.len();
        for pass in 0..n.saturating_sub(1) {
            let mut swapped = false;
            for j in 0..n - 1 - pass {
                if self.compare(j, j + 1) == Ordering::Greater {
                    self.swap(j, j + 1);
                    swapped = true;
                }
            }
            self.mark_sorted([n - 1 - pass]);
            if !swapped {
                break;
            }
        }
    }

    fn selection(&mut self) {
        let n = self.data.len();
        for i in 0..n.saturating_sub(1) {
            let mut min = i;
            for j in i + 1..n {
                if self.compare(j, min) == Ordering::Less {
                    min = j;
                }
            }
            self.swap(i, min);
            self.mark_sorted([i]);
        }
    }

    fn insertion(&mut self) {
        for i in 1..self.data.len() {
            let mut j = i;
            while j > 0 && self.compare(j - 1, j) == Ordering::Greater {
                self.swap(j - 1, j);
                j -= 1;
            }
        }
    }

    /// Top-down merge sort over `[lo, hi)`.
    fn merge_sort(&mut self, lo: usize, hi: usize) {
        if hi - lo < 2 {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        self.merge_sort(lo, mid);
        self.merge_sort(mid, hi);
        self.merge(lo, mid, hi);
    }

    /// Merge the sorted runs `[lo, mid)` and `[mid, hi)` in place.
    ///
    /// `[left, right)` holds what is left of the first run and `[right, hi)`
    /// the rest of the second, so both compared values sit in the slots the
    /// compare step names. A smaller right head is rotated down into place
    /// with adjacent swaps; ties stay put, which keeps the sort stable.
    fn merge(&mut self, lo: usize, mid: usize, hi: usize) {
        let (mut left, mut right) = (lo, mid);

        while left < right && right < hi {
            if self.compare(left, right) == Ordering::Greater {
                for slot in (left..right).rev() {
                    self.swap(slot, slot + 1);
                }
                right += 1;
            }
            left += 1;
        }
    }

    /// Lomuto partitioning with the last element as pivot.
    fn quick(&mut self) {
        let mut pending = vec![(0, self.data.len())];

        while let Some((lo, hi)) = pending.pop() {
            if hi - lo < 2 {
                if hi - lo == 1 {
                    self.mark_sorted([lo]);
                }
                continue;
            }

            let pivot = hi - 1;
            self.log.push(Step::highlight(
                [Target::Element(pivot)],
                format!("Pivot {}", self.data[pivot]),
            ));

            let mut store = lo;
            for j in lo..pivot {
                if self.compare(j, pivot) == Ordering::Less {
                    self.swap(store, j);
                    store += 1;
                }
            }
            self.swap(store, pivot);
            self.mark_sorted([store]);

            // Left partition is popped first
            pending.push((store + 1, hi));
            pending.push((lo, store));
        }
    }

    fn heap(&mut self) {
        let n = self.data.len();
        for start in (0..n / 2).rev() {
            self.sift_down(start, n);
        }
        for end in (1..n).rev() {
            self.swap(0, end);
            self.mark_sorted([end]);
            self.sift_down(0, end);
        }
    }

    fn sift_down(&mut self, mut root: usize, end: usize) {
        loop {
            let left = 2 * root + 1;
            if left >= end {
                break;
            }
            let mut largest = root;
            if self.compare(left, largest) == Ordering::Greater {
                largest = left;
            }
            let right = left + 1;
            if right < end && self.compare(right, largest) == Ordering::Greater {
                largest = right;
            }
            if largest == root {
                break;
            }
            self.swap(root, largest);
            root = largest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stepwise_trace::{Payload, StepKind};

    #[test]
    fn bubble_small_input() {
        let run = sort(SortAlgorithm::Bubble, &[3, 1, 2]);
        assert_eq!(run.output, vec![1, 2, 3]);
        assert_eq!(run.log.count(StepKind::Compare), 3);
        assert!(run.log.count(StepKind::Swap) >= 1);
    }

    #[test]
    fn bubble_stops_after_clean_pass() {
        let run = sort(SortAlgorithm::Bubble, &[1, 2, 3, 4]);
        assert_eq!(run.log.count(StepKind::Compare), 3);
        assert_eq!(run.log.count(StepKind::Swap), 0);
    }

    #[test]
    fn every_element_ends_sorted() {
        for algorithm in SortAlgorithm::ALL {
            let run = sort(algorithm, &[5, 2, 9, 1, 5, 6]);
            let mut marked: Vec<usize> = run
                .log
                .steps()
                .iter()
                .filter(|s| s.tag == Tag::Sorted)
                .flat_map(|s| s.targets.iter())
                .filter_map(|t| match t {
                    Target::Element(i) => Some(*i),
                    _ => None,
                })
                .collect();
            marked.sort_unstable();
            assert_eq!(marked, vec![0, 1, 2, 3, 4, 5], "{}", algorithm.name());
        }
    }

    #[test]
    fn quick_sort_skips_self_swaps() {
        let run = sort(SortAlgorithm::Quick, &[1, 2, 3]);
        assert_eq!(run.output, vec![1, 2, 3]);
        assert_eq!(run.log.count(StepKind::Swap), 0);
    }

    #[test]
    fn merge_sort_rotates_in_place() {
        let run = sort(SortAlgorithm::Merge, &[2, 1]);
        assert_eq!(run.output, vec![1, 2]);
        assert_eq!(run.log.count(StepKind::Set), 0);
        assert_eq!(run.log.count(StepKind::Swap), 1);

        // 1 overtakes 3 and 4 in the final merge
        let run = sort(SortAlgorithm::Merge, &[3, 4, 1, 2]);
        assert_eq!(run.output, vec![1, 2, 3, 4]);
        assert_eq!(run.log.count(StepKind::Compare), 4);
        assert_eq!(run.log.count(StepKind::Swap), 4);
    }

    #[test]
    fn compares_name_the_slots_they_read() {
        for algorithm in SortAlgorithm::ALL {
            let values = [3, 4, 1, 2, 8, -1, 4, 0];
            let run = sort(algorithm, &values);
            let mut data = values.to_vec();

            for step in run.log.steps() {
                match (step.kind, &step.targets[..]) {
                    (StepKind::Compare, &[Target::Element(a), Target::Element(b)]) => {
                        assert_eq!(
                            step.description,
                            format!("Compare {} and {}", data[a], data[b]),
                            "{}",
                            algorithm.name()
                        );
                    }
                    (StepKind::Swap, &[Target::Element(a), Target::Element(b)]) => {
                        data.swap(a, b);
                    }
                    (StepKind::Set, &[Target::Element(i)]) => {
                        if let Payload::Value(v) = step.payload {
                            data[i] = v;
                        }
                    }
                    _ => {}
                }
            }
            assert_eq!(data, run.output, "{}", algorithm.name());
        }
    }

    #[test]
    fn empty_and_single_inputs() {
        for algorithm in SortAlgorithm::ALL {
            let run = sort(algorithm, &[]);
            assert!(run.output.is_empty());
            assert!(run.log.is_empty());

            let run = sort(algorithm, &[7]);
            assert_eq!(run.output, vec![7]);
            assert_eq!(run.log.count(StepKind::Compare), 0);
        }
    }

    /// Replay swap steps over (value, original index) pairs.
    fn replay_swaps(values: &[i64], run: &Run<Vec<i64>>) -> Vec<(i64, usize)> {
        let mut tagged: Vec<(i64, usize)> = values.iter().copied().zip(0..).collect();
        for step in run.log.steps().iter().filter(|s| s.kind == StepKind::Swap) {
            if let [Target::Element(a), Target::Element(b)] = step.targets[..] {
                tagged.swap(a, b);
            }
        }
        tagged
    }

    proptest! {
        #[test]
        fn sorts_match_std(values in prop::collection::vec(-50i64..50, 0..40)) {
            let mut expected = values.clone();
            expected.sort();
            for algorithm in SortAlgorithm::ALL {
                prop_assert_eq!(&sort(algorithm, &values).output, &expected);
            }
        }

        #[test]
        fn sorts_are_deterministic(values in prop::collection::vec(-50i64..50, 0..40)) {
            for algorithm in SortAlgorithm::ALL {
                prop_assert_eq!(sort(algorithm, &values).log, sort(algorithm, &values).log);
            }
        }

        #[test]
        fn stable_sorts_keep_ties(values in prop::collection::vec(0i64..5, 0..30)) {
            for algorithm in SortAlgorithm::ALL.into_iter().filter(|a| a.is_stable()) {
                let run = sort(algorithm, &values);
                let replayed = replay_swaps(&values, &run);
                for pair in replayed.windows(2) {
                    prop_assert!(pair[0].0 < pair[1].0 || pair[0].1 < pair[1].1);
                }
            }
        }
    }
}
