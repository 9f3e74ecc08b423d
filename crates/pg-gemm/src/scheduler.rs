//! Fork-join execution of a planned GEMM over a bounded worker pool.
//!
//! The calling thread produces one task per output tile into a bounded
//! channel; scoped workers drain it. A tile is owned by the worker that
//! received it for the whole contraction walk, so C itself needs no locking.

use std::thread;

use crossbeam_channel::bounded;

use crate::config::GemmConfig;
use crate::error::Result;
use crate::kernel::Kernel;
use crate::plan::{self, BlockPlan, Tile};
use crate::view::{MatrixMut, MatrixRef};

/// How a call was executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing to accumulate: empty output, zero contraction or `alpha == 0`.
    Skipped,
    /// Whole problem run by one kernel call on the calling thread.
    Serial,
    /// Tiles fanned out to worker threads.
    Parallel {
        workers: usize,
        queue_capacity: usize,
        tiles: usize,
    },
}

/// Accumulate `alpha * op(a) * op(b)` into `c`, in parallel when the output
/// has at least `config.min_parallel_blocks` tiles.
///
/// # Errors
/// - `GemmError::InvalidConfig` if `config` fails validation.
/// - `GemmError::Dimension` if op(a), op(b) and `c` do not conform.
pub fn execute(
    kernel: Kernel,
    a: MatrixRef<'_>,
    b: MatrixRef<'_>,
    c: &mut MatrixMut<'_>,
    alpha: f64,
    config: &GemmConfig,
) -> Result<Dispatch> {
    config.validate()?;
    plan::conform(kernel, &a, &b, c.rows(), c.cols())?;
    let plan = BlockPlan::new(&a, &b, kernel, config.block_size);
    let tiles = plan.parallel_blocks();

    if tiles == 0 || tiles < config.min_parallel_blocks {
        log::debug!(
            "gemm {:?} {}x{}x{}: {} tiles below threshold {}, running serially",
            kernel,
            plan.out_rows,
            plan.out_cols,
            plan.contraction_len,
            tiles,
            config.min_parallel_blocks
        );
        kernel.run(a, b, c, alpha);
        return Ok(Dispatch::Serial);
    }

    let workers = config.available_workers().min(tiles);
    // Small buffers make workers wait for work, large ones only cost memory.
    let queue_capacity = config.buffer_multiplier.saturating_mul(workers).min(tiles);
    log::debug!(
        "gemm {:?} {}x{}x{}: {} tiles over {} workers (queue {})",
        kernel,
        plan.out_rows,
        plan.out_cols,
        plan.contraction_len,
        tiles,
        workers,
        queue_capacity
    );

    let (tx, rx) = bounded::<Tile>(queue_capacity);
    let out = c.reborrow();
    let out = &out;

    thread::scope(|s| {
        for worker in 0..workers {
            let rx = rx.clone();
            s.spawn(move || {
                let mut done = 0usize;
                for tile in rx.iter() {
                    compute_tile(kernel, &plan, &a, &b, out, tile, alpha);
                    done += 1;
                }
                log::trace!("gemm worker {} finished {} tiles", worker, done);
            });
        }
        drop(rx);

        for tile in plan.tiles() {
            // Only fails once every worker is gone, i.e. one panicked; the
            // scope re-raises that panic on exit.
            if tx.send(tile).is_err() {
                break;
            }
        }
        drop(tx);
    });

    Ok(Dispatch::Parallel {
        workers,
        queue_capacity,
        tiles,
    })
}

fn compute_tile(
    kernel: Kernel,
    plan: &BlockPlan,
    a: &MatrixRef<'_>,
    b: &MatrixRef<'_>,
    out: &MatrixMut<'_>,
    tile: Tile,
    alpha: f64,
) {
    let (rows, cols) = plan.tile_extent(tile);
    // SAFETY: tiles of one plan are disjoint and each is sent exactly once,
    // and the parent view is not touched until the scope has joined.
    let mut c_sub = unsafe { out.tile(tile.i0, tile.j0, rows, cols) };
    for (k0, klen) in plan.chunks() {
        let a_sub = kernel.a_block(a, tile.i0, rows, k0, klen);
        let b_sub = kernel.b_block(b, tile.j0, cols, k0, klen);
        kernel.run(a_sub, b_sub, &mut c_sub, alpha);
    }
}
