//! Chunked, reproducible parallel filling of path-major buffers.
//!
//! Work is split along the path axis into chunks of [`CHUNK_PATHS`] rows.
//! Each chunk owns a [`SimRng`] seeded from the batch's base seed and the
//! chunk index, so parallel and sequential execution produce identical
//! output. Small batches run sequentially to avoid scheduling overhead.

use rayon::prelude::*;

use crate::rng::{chunk_seed, SimRng};

/// Paths per chunk.
pub const CHUNK_PATHS: usize = 1024;

/// Configuration for parallel batch work.
#[derive(Clone, Copy, Debug)]
pub struct ParallelConfig {
    /// Minimum paths per thread before parallelisation kicks in.
    pub min_paths_per_thread: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            min_paths_per_thread: CHUNK_PATHS,
        }
    }
}

impl ParallelConfig {
    /// Determines if parallelisation should be used for the given path count.
    #[inline]
    pub fn should_parallelise(&self, n_paths: usize) -> bool {
        let n_threads = rayon::current_num_threads();
        n_threads > 1 && n_paths >= self.min_paths_per_thread * n_threads
    }
}

/// Fills a row-major `[paths][row_len]` buffer chunk by chunk.
///
/// `fill` receives the chunk's generator and its rows (`rows × row_len`
/// values). The first error returned by any chunk aborts the fill.
pub fn fill_rows_seeded<E, F>(
    buffer: &mut [f64],
    row_len: usize,
    base_seed: u64,
    fill: F,
) -> Result<(), E>
where
    E: Send,
    F: Fn(&mut SimRng, &mut [f64]) -> Result<(), E> + Sync,
{
    if buffer.is_empty() || row_len == 0 {
        return Ok(());
    }

    let chunk_len = CHUNK_PATHS * row_len;
    let n_paths = buffer.len() / row_len;
    let work = |(index, chunk): (usize, &mut [f64])| {
        let mut rng = SimRng::from_seed(chunk_seed(base_seed, index));
        fill(&mut rng, chunk)
    };

    if ParallelConfig::default().should_parallelise(n_paths) {
        buffer.par_chunks_mut(chunk_len).enumerate().try_for_each(work)
    } else {
        buffer.chunks_mut(chunk_len).enumerate().try_for_each(work)
    }
}

/// Maps each input row to one output row, in parallel for large batches.
pub fn map_rows<E, F>(
    input: &[f64],
    in_len: usize,
    output: &mut [f64],
    out_len: usize,
    map: F,
) -> Result<(), E>
where
    E: Send,
    F: Fn(&[f64], &mut [f64]) -> Result<(), E> + Sync,
{
    if in_len == 0 || out_len == 0 {
        return Ok(());
    }

    let n_paths = input.len() / in_len;
    if ParallelConfig::default().should_parallelise(n_paths) {
        output
            .par_chunks_mut(out_len)
            .zip(input.par_chunks(in_len))
            .with_min_len(CHUNK_PATHS)
            .try_for_each(|(out, row)| map(row, out))
    } else {
        output
            .chunks_mut(out_len)
            .zip(input.chunks(in_len))
            .try_for_each(|(out, row)| map(row, out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_is_thread_count_independent() {
        let fill = |rng: &mut SimRng, rows: &mut [f64]| -> Result<(), ()> {
            rng.fill_uniform(rows);
            Ok(())
        };

        let mut a = vec![0.0; 5000 * 2];
        fill_rows_seeded(&mut a, 2, 99, fill).unwrap();

        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let mut b = vec![0.0; 5000 * 2];
        pool.install(|| fill_rows_seeded(&mut b, 2, 99, fill)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_fill_chunks_use_distinct_streams() {
        let mut buffer = vec![0.0; 2 * CHUNK_PATHS];
        fill_rows_seeded(&mut buffer, 1, 5, |rng, rows| -> Result<(), ()> {
            rng.fill_uniform(rows);
            Ok(())
        })
        .unwrap();
        assert_ne!(buffer[..CHUNK_PATHS], buffer[CHUNK_PATHS..]);
    }

    #[test]
    fn test_fill_propagates_error() {
        let mut buffer = vec![0.0; 10];
        let result = fill_rows_seeded(&mut buffer, 1, 0, |_, _| Err("boom"));
        assert_eq!(result, Err("boom"));
    }

    #[test]
    fn test_map_rows() {
        let input = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut output = vec![0.0; 3];
        map_rows(&input, 2, &mut output, 1, |row, out| -> Result<(), ()> {
            out[0] = row[0] + row[1];
            Ok(())
        })
        .unwrap();
        assert_eq!(output, vec![3.0, 7.0, 11.0]);
    }

    #[test]
    fn test_should_parallelise_small_batch() {
        let config = ParallelConfig::default();
        assert!(!config.should_parallelise(10));
    }
}
