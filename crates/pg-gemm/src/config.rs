use crate::error::{GemmError, Result};

/// Edge length of an output tile and of a contraction chunk.
pub const BLOCK_SIZE: usize = 64;
/// Minimum number of output tiles before work is spread over threads.
pub const MIN_PARALLEL_BLOCKS: usize = 4;
/// Task-queue capacity per worker.
pub const BUFFER_MULTIPLIER: usize = 4;

/// Fixed blocking and threading constants for one GEMM call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GemmConfig {
    /// Tile edge length, used for both output tiles and contraction chunks.
    pub block_size: usize,
    /// Below this many output tiles the call runs serially.
    pub min_parallel_blocks: usize,
    /// Queue capacity is `buffer_multiplier * workers`, capped at the tile count.
    pub buffer_multiplier: usize,
    /// Upper bound on worker threads. `None` uses the available parallelism.
    pub max_workers: Option<usize>,
}

impl Default for GemmConfig {
    fn default() -> Self {
        GemmConfig {
            block_size: BLOCK_SIZE,
            min_parallel_blocks: MIN_PARALLEL_BLOCKS,
            buffer_multiplier: BUFFER_MULTIPLIER,
            max_workers: None,
        }
    }
}

impl GemmConfig {
    /// Configuration that never leaves the calling thread.
    pub fn serial() -> Self {
        GemmConfig {
            min_parallel_blocks: usize::MAX,
            ..Self::default()
        }
    }

    /// Reject values that would make the scheduler stall or loop forever.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(GemmError::InvalidConfig(
                "block_size must be > 0".to_string(),
            ));
        }
        if self.buffer_multiplier == 0 {
            return Err(GemmError::InvalidConfig(
                "buffer_multiplier must be > 0".to_string(),
            ));
        }
        if self.max_workers == Some(0) {
            return Err(GemmError::InvalidConfig(
                "max_workers must be > 0 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of threads the hardware offers, capped by `max_workers`.
    pub fn available_workers(&self) -> usize {
        let hw = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        match self.max_workers {
            Some(cap) => hw.min(cap),
            None => hw,
        }
    }
}
