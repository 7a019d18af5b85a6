//! Numeric arrays handed to visuals by ingestion code.
//!
//! The engine does not parse files; its only contract with ingested data is
//! shape validation. Arrays are row-major with `rows = item count` and
//! `cols = dimensionality`.

mod array;

pub use array::{Array2, Shape};

/// Sorted, deduplicated copy of `values`.
pub fn unique_sorted<T: Ord + Copy>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = values.into_iter().collect();
    out.sort_unstable();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_sorted_drops_duplicates() {
        assert_eq!(unique_sorted([3u32, 1, 3, 2, 1]), vec![1, 2, 3]);
    }

    #[test]
    fn unique_sorted_of_nothing_is_empty() {
        assert!(unique_sorted(Vec::<u32>::new()).is_empty());
    }
}
