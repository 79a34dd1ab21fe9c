//! Request slicing.
//!
//! Both sides are cut at the same offsets: batch `i` holds positions
//! `[i * size, (i + 1) * size)` of each side, or whatever part of that
//! range exists. The shorter side simply runs out first.

use std::num::NonZeroUsize;

/// One request's worth of searches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Batch<'a, T> {
    /// Zero-based position of this batch in the run.
    pub index: usize,
    pub departures: &'a [T],
    pub arrivals: &'a [T],
}

/// Number of batches needed for `departures` and `arrivals` records.
pub fn slice_count(departures: usize, arrivals: usize, size: NonZeroUsize) -> usize {
    departures.max(arrivals).div_ceil(size.get())
}

/// Split both sides into aligned batches of at most `size` records each.
pub fn batches<'a, T>(
    departures: &'a [T],
    arrivals: &'a [T],
    size: NonZeroUsize,
) -> impl Iterator<Item = Batch<'a, T>> + 'a {
    let count = slice_count(departures.len(), arrivals.len(), size);
    let size = size.get();

    (0..count).map(move |index| Batch {
        index,
        departures: window(departures, index, size),
        arrivals: window(arrivals, index, size),
    })
}

fn window<T>(records: &[T], index: usize, size: usize) -> &[T] {
    let start = (index * size).min(records.len());
    let end = start.saturating_add(size).min(records.len());
    &records[start..end]
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn every_record_in_exactly_one_batch_in_order(
            nd in 0usize..200,
            na in 0usize..200,
            s in 1usize..40,
        ) {
            let departures: Vec<usize> = (0..nd).collect();
            let arrivals: Vec<usize> = (0..na).collect();
            let size = NonZeroUsize::new(s).unwrap();

            let all: Vec<_> = batches(&departures, &arrivals, size).collect();
            prop_assert_eq!(all.len(), nd.max(na).div_ceil(s));

            let flat_dep: Vec<usize> = all.iter().flat_map(|b| b.departures.iter().copied()).collect();
            let flat_arr: Vec<usize> = all.iter().flat_map(|b| b.arrivals.iter().copied()).collect();
            prop_assert_eq!(&flat_dep, &departures);
            prop_assert_eq!(&flat_arr, &arrivals);

            for (i, batch) in all.iter().enumerate() {
                prop_assert_eq!(batch.index, i);
                prop_assert!(batch.departures.len() <= s);
                prop_assert!(batch.arrivals.len() <= s);
                prop_assert!(!(batch.departures.is_empty() && batch.arrivals.is_empty()));
            }
        }
    }
}
