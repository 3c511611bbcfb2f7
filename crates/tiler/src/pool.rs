//! Fixed-size pool of tile workers.
//!
//! Workers pull tiles from a shared iterator, render them with their own
//! [`WorkerContext`] and push results through a bounded channel. The calling
//! thread drains the channel and hands each result to the sink in
//! completion order. With a single worker everything runs on the calling
//! thread.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::sync::Mutex;
use std::thread;

use grid_processor::RasterSource;
use tile_common::TileCoord;
use tracing::{debug, warn};

use crate::error::{Result, TilerError};
use crate::render::{RenderedTile, TileWorkerFactory, WorkerContext};

/// Results buffered per worker before workers block.
const CHANNEL_DEPTH_PER_WORKER: usize = 2;

/// Counts reported by [`WorkerPool::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub workers: usize,
    /// Tiles accepted by the sink.
    pub tiles: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(TilerError::configuration("worker count must be at least 1"));
        }
        Ok(Self { workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Render every tile of `tiles` and feed the results to `sink`.
    ///
    /// Stops at the first failure (factory, render, panic or sink) and
    /// returns it once all workers have exited.
    pub fn run<I, F, K>(&self, tiles: I, factory: &F, sink: K) -> Result<PoolStats>
    where
        I: Iterator<Item = TileCoord> + Send,
        F: TileWorkerFactory,
        K: FnMut(RenderedTile) -> Result<()>,
    {
        if self.workers == 1 {
            run_sequential(tiles, factory, sink)
        } else {
            self.run_parallel(tiles, factory, sink)
        }
    }

    fn run_parallel<I, F, K>(&self, tiles: I, factory: &F, mut sink: K) -> Result<PoolStats>
    where
        I: Iterator<Item = TileCoord> + Send,
        F: TileWorkerFactory,
        K: FnMut(RenderedTile) -> Result<()>,
    {
        let queue = Mutex::new(tiles);
        let abort = AtomicBool::new(false);
        let (tx, rx) = mpsc::sync_channel(self.workers * CHANNEL_DEPTH_PER_WORKER);

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.workers);
            for worker_id in 0..self.workers {
                let tx = tx.clone();
                let queue = &queue;
                let abort = &abort;
                handles.push(scope.spawn(move || {
                    worker_loop(worker_id, factory, queue, abort, &tx);
                }));
            }
            drop(tx);

            let mut first_error = None;
            let mut accepted = 0u64;
            for result in rx.iter() {
                match result.and_then(&mut sink) {
                    Ok(()) => accepted += 1,
                    Err(e) => {
                        abort.store(true, Ordering::SeqCst);
                        first_error = Some(e);
                        break;
                    }
                }
            }
            // Unblock workers waiting on a full channel
            drop(rx);

            for handle in handles {
                if let Err(payload) = handle.join() {
                    let err = TilerError::WorkerPanicked(panic_message(payload.as_ref()));
                    first_error.get_or_insert(err);
                }
            }

            match first_error {
                Some(e) => Err(e),
                None => Ok(PoolStats {
                    workers: self.workers,
                    tiles: accepted,
                }),
            }
        })
    }
}

fn run_sequential<I, F, K>(tiles: I, factory: &F, mut sink: K) -> Result<PoolStats>
where
    I: Iterator<Item = TileCoord>,
    F: TileWorkerFactory,
    K: FnMut(RenderedTile) -> Result<()>,
{
    let mut ctx = guarded(|| factory.create(0))?;
    let mut accepted = 0u64;
    for tile in tiles {
        sink(render_guarded(&mut ctx, tile)?)?;
        accepted += 1;
    }
    Ok(PoolStats {
        workers: 1,
        tiles: accepted,
    })
}

fn worker_loop<I, F>(
    worker_id: usize,
    factory: &F,
    queue: &Mutex<I>,
    abort: &AtomicBool,
    tx: &SyncSender<Result<RenderedTile>>,
) where
    I: Iterator<Item = TileCoord>,
    F: TileWorkerFactory,
{
    let mut ctx = match guarded(|| factory.create(worker_id)) {
        Ok(ctx) => ctx,
        Err(e) => {
            abort.store(true, Ordering::SeqCst);
            let _ = tx.send(Err(e));
            return;
        }
    };

    let mut rendered = 0u64;
    while !abort.load(Ordering::SeqCst) {
        let next = match queue.lock() {
            Ok(mut tiles) => tiles.next(),
            Err(_) => {
                let _ = tx.send(Err(TilerError::WorkerPanicked(
                    "tile queue lock poisoned".to_string(),
                )));
                break;
            }
        };
        let Some(tile) = next else {
            break;
        };

        let result = render_guarded(&mut ctx, tile);
        if let Err(e) = &result {
            warn!(worker_id, tile = %tile, error = %e, "Tile failed");
            abort.store(true, Ordering::SeqCst);
        }
        let failed = result.is_err();
        if tx.send(result).is_err() || failed {
            break;
        }
        rendered += 1;
    }

    debug!(worker_id, rendered, "Worker finished");
}

/// Run `f`, turning a panic into [`TilerError::WorkerPanicked`].
fn guarded<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(TilerError::WorkerPanicked(panic_message(payload.as_ref()))))
}

/// Render one tile, naming it in the error if the render panics.
fn render_guarded<S: RasterSource>(
    ctx: &mut WorkerContext<S>,
    tile: TileCoord,
) -> Result<RenderedTile> {
    guarded(|| ctx.render(tile)).map_err(|e| match e {
        TilerError::WorkerPanicked(msg) => {
            TilerError::WorkerPanicked(format!("tile {}: {}", tile, msg))
        }
        other => other,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use grid_processor::{GridProcessorError, InMemoryRaster, RasterInfo, RasterSource};
    use tile_common::{BoundingBox, CrsCode};

    use super::*;
    use crate::config::EncodingConfig;
    use crate::grid::tile_grid;
    use crate::render::WorkerContext;

    fn config() -> EncodingConfig {
        EncodingConfig {
            tile_size: 32,
            ..EncodingConfig::default()
        }
    }

    /// A west-to-east ramp so every tile has different content.
    fn ramp() -> InMemoryRaster {
        let (w, h) = (72, 36);
        let data = (0..w * h).map(|i| (i % w) as f32 * 10.0).collect();
        let info = RasterInfo::north_up(
            w,
            h,
            BoundingBox::new(-180.0, -90.0, 180.0, 90.0),
            CrsCode::Epsg4326,
        );
        InMemoryRaster::new(info, data).unwrap()
    }

    fn ramp_factory(id: usize) -> Result<WorkerContext<InMemoryRaster>> {
        Ok(WorkerContext::new(id, ramp(), config()))
    }

    fn world_tiles(max_zoom: u8) -> crate::grid::TileGrid {
        let bbox = BoundingBox::new(-180.0, -85.0, 180.0, 85.0);
        tile_grid(&bbox, CrsCode::Epsg4326, 0, max_zoom).unwrap()
    }

    fn collect(workers: usize) -> BTreeMap<TileCoord, Vec<u8>> {
        let mut out = BTreeMap::new();
        let stats = WorkerPool::new(workers)
            .unwrap()
            .run(world_tiles(2), &ramp_factory, |t| {
                out.insert(t.tile, t.bytes);
                Ok(())
            })
            .unwrap();
        assert_eq!(stats.tiles, 21);
        out
    }

    /// Source whose reads always fail or panic.
    struct BrokenSource {
        inner: InMemoryRaster,
        panic: bool,
    }

    impl RasterSource for BrokenSource {
        fn info(&self) -> &RasterInfo {
            self.inner.info()
        }

        fn read_band(&mut self, _band: usize) -> grid_processor::Result<&[f32]> {
            if self.panic {
                panic!("decoder exploded");
            }
            Err(GridProcessorError::read_failed("truncated strip"))
        }
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(TilerError::Configuration(_))));
    }

    #[test]
    fn test_worker_counts_agree() {
        let sequential = collect(1);
        let parallel = collect(4);
        assert_eq!(sequential.len(), 21);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_factory_called_once_per_worker() {
        let calls = Mutex::new(Vec::new());
        let factory = |id: usize| -> Result<WorkerContext<InMemoryRaster>> {
            calls.lock().unwrap().push(id);
            ramp_factory(id)
        };
        WorkerPool::new(3)
            .unwrap()
            .run(world_tiles(1), &factory, |_| Ok(()))
            .unwrap();
        let mut ids = calls.into_inner().unwrap();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_render_error_propagates() {
        for workers in [1, 3] {
            let factory = |id: usize| -> Result<WorkerContext<BrokenSource>> {
                let source = BrokenSource {
                    inner: ramp(),
                    panic: false,
                };
                Ok(WorkerContext::new(id, source, config()))
            };
            let result = WorkerPool::new(workers)
                .unwrap()
                .run(world_tiles(3), &factory, |_| Ok(()));
            assert!(
                matches!(result, Err(TilerError::TileRender { .. })),
                "workers={}: {:?}",
                workers,
                result.err()
            );
        }
    }

    #[test]
    fn test_panic_becomes_error_naming_tile() {
        for workers in [1, 2] {
            let factory = |id: usize| -> Result<WorkerContext<BrokenSource>> {
                let source = BrokenSource {
                    inner: ramp(),
                    panic: true,
                };
                Ok(WorkerContext::new(id, source, config()))
            };
            // Only tile 0/0/0 exists at zoom 0
            let result = WorkerPool::new(workers)
                .unwrap()
                .run(world_tiles(0), &factory, |_| Ok(()));
            match result {
                Err(TilerError::WorkerPanicked(msg)) => {
                    assert!(msg.contains("decoder exploded"), "{}", msg);
                    assert!(msg.starts_with("tile 0/0/0: "), "{}", msg);
                }
                other => panic!("expected WorkerPanicked, got {:?}", other.err()),
            }
        }
    }

    #[test]
    fn test_factory_error_propagates() {
        let factory = |_: usize| -> Result<WorkerContext<InMemoryRaster>> {
            Err(TilerError::source_read("missing.tif", "not found"))
        };
        let result = WorkerPool::new(4)
            .unwrap()
            .run(world_tiles(2), &factory, |_| Ok(()));
        assert!(matches!(result, Err(TilerError::SourceRead { .. })));
    }

    #[test]
    fn test_sink_error_stops_run() {
        let mut seen = 0;
        let result = WorkerPool::new(4).unwrap().run(world_tiles(4), &ramp_factory, |_| {
            seen += 1;
            if seen == 3 {
                Err(TilerError::configuration("stop"))
            } else {
                Ok(())
            }
        });
        assert!(matches!(result, Err(TilerError::Configuration(_))));
        assert_eq!(seen, 3);
    }
}
