//! Row-block parallelism over a dedicated rayon pool

use std::ops::Range;

use layered_core::at_least_one;
use rayon::prelude::*;

use crate::error::Result;

/// Split `0..total` into at most `num_threads` contiguous blocks
///
/// Blocks are as even as possible and never empty; `total == 0` yields
/// no blocks.
pub fn partition(total: usize, num_threads: usize) -> Vec<Range<usize>> {
    let workers = at_least_one(num_threads).min(at_least_one(total));
    let per_worker = total.div_ceil(workers);
    (0..workers)
        .map(|w| (w * per_worker).min(total)..((w + 1) * per_worker).min(total))
        .filter(|r| !r.is_empty())
        .collect()
}

/// Run `work` on every block of `0..total`, returning results in block order
///
/// A single block runs on the calling thread; otherwise a pool of
/// `num_threads` workers is built for the duration of the call.
pub fn parallelize<T, F>(total: usize, num_threads: usize, work: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(Range<usize>) -> Result<T> + Sync,
{
    let blocks = partition(total, num_threads);
    if blocks.len() <= 1 {
        return blocks.into_iter().map(&work).collect();
    }

    tracing::debug!(total, workers = blocks.len(), "dispatching row blocks");
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(blocks.len())
        .build()?;
    pool.install(|| blocks.into_par_iter().map(&work).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_even_and_uneven() {
        assert_eq!(partition(10, 2), vec![0..5, 5..10]);
        assert_eq!(partition(10, 3), vec![0..4, 4..8, 8..10]);
        assert_eq!(partition(2, 8), vec![0..1, 1..2]);
    }

    #[test]
    fn test_partition_degenerate() {
        assert_eq!(partition(5, 0), vec![0..5]);
        assert!(partition(0, 4).is_empty());
    }

    #[test]
    fn test_parallelize_preserves_order() {
        let sums = parallelize(100, 4, |range| Ok(range.sum::<usize>())).unwrap();
        assert_eq!(sums.len(), 4);
        assert_eq!(sums.iter().sum::<usize>(), (0..100).sum::<usize>());
        assert_eq!(sums[0], (0..25).sum::<usize>());
    }

    #[test]
    fn test_parallelize_propagates_errors() {
        let result = parallelize(10, 2, |range| {
            if range.start == 0 {
                Ok(())
            } else {
                Err(layered_core::LayeredError::InvalidRange.into())
            }
        });
        assert!(result.is_err());
    }
}
