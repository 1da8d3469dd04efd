//! Bounded resource pools for the pointer-move and mosaic hot paths.
//!
//! Pools only recycle allocations; they hold no state that affects output,
//! so clearing them at any time is safe. Instances are owned by whoever
//! renders (normally the [`ScreenshotManager`](crate::manager::ScreenshotManager))
//! and passed down by reference.
//!
//! Interior mutability (`RefCell`) is used because all rendering happens on
//! a single UI thread.

use std::cell::{Cell, RefCell};

use crate::config::PoolConfig;

/// Pool of ARGB32 Cairo image surfaces keyed by size.
#[derive(Debug)]
pub struct SurfacePool {
    capacity: usize,
    free: RefCell<Vec<cairo::ImageSurface>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl SurfacePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            free: RefCell::new(Vec::with_capacity(capacity)),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    /// Returns a cleared `width` x `height` surface, reusing a pooled one when
    /// an exact size match is available.
    pub fn acquire(&self, width: i32, height: i32) -> Result<cairo::ImageSurface, cairo::Error> {
        let reused = {
            let mut free = self.free.borrow_mut();
            free.iter()
                .position(|s| s.width() == width && s.height() == height)
                .map(|idx| free.swap_remove(idx))
        };

        match reused {
            Some(surface) => {
                self.hits.set(self.hits.get() + 1);
                {
                    let ctx = cairo::Context::new(&surface)?;
                    ctx.set_operator(cairo::Operator::Clear);
                    ctx.paint()?;
                }
                Ok(surface)
            }
            None => {
                self.misses.set(self.misses.get() + 1);
                cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)
            }
        }
    }

    /// Returns a surface to the pool; dropped when the pool is full.
    pub fn release(&self, surface: cairo::ImageSurface) {
        let mut free = self.free.borrow_mut();
        if free.len() < self.capacity {
            free.push(surface);
        }
    }

    pub fn clear(&self) {
        self.free.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.free.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits.get(), self.misses.get())
    }
}

/// Bounded pool of reusable values (typically `Vec` scratch buffers).
///
/// Released values are reset with `reset` before being handed out again.
#[derive(Debug)]
pub struct ObjectPool<T> {
    capacity: usize,
    free: RefCell<Vec<T>>,
    reset: fn(&mut T),
}

impl<T: Default> ObjectPool<T> {
    pub fn new(capacity: usize, reset: fn(&mut T)) -> Self {
        Self {
            capacity,
            free: RefCell::new(Vec::with_capacity(capacity)),
            reset,
        }
    }

    pub fn acquire(&self) -> T {
        self.free.borrow_mut().pop().unwrap_or_default()
    }

    pub fn release(&self, mut value: T) {
        (self.reset)(&mut value);
        let mut free = self.free.borrow_mut();
        if free.len() < self.capacity {
            free.push(value);
        }
    }

    pub fn clear(&self) {
        self.free.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.free.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scratch buffer of device-space points.
pub type PointBuffer = Vec<(f64, f64)>;

/// The pools used while rendering annotations.
#[derive(Debug)]
pub struct RenderPools {
    pub surfaces: SurfacePool,
    pub points: ObjectPool<PointBuffer>,
}

impl RenderPools {
    pub fn new(config: &PoolConfig) -> Self {
        Self {
            surfaces: SurfacePool::new(config.surface_capacity),
            points: ObjectPool::new(config.object_capacity, Vec::clear),
        }
    }

    pub fn clear(&self) {
        self.surfaces.clear();
        self.points.clear();
    }
}

impl Default for RenderPools {
    fn default() -> Self {
        Self::new(&PoolConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_pool_resets_and_bounds() {
        let pool: ObjectPool<PointBuffer> = ObjectPool::new(1, Vec::clear);
        let mut a = pool.acquire();
        a.push((1.0, 2.0));
        pool.release(a);
        pool.release(vec![(3.0, 4.0)]);
        assert_eq!(pool.len(), 1);
        let b = pool.acquire();
        assert!(b.is_empty());
        assert!(b.capacity() >= 1);
    }

    #[test]
    fn surface_pool_reuses_matching_size() {
        let pool = SurfacePool::new(2);
        let surface = pool.acquire(8, 8).unwrap();
        pool.release(surface);
        let again = pool.acquire(8, 8).unwrap();
        assert_eq!((again.width(), again.height()), (8, 8));
        assert_eq!(pool.stats(), (1, 1));
        let other = pool.acquire(4, 4).unwrap();
        assert_eq!(other.width(), 4);
        assert_eq!(pool.stats(), (1, 2));
    }

    #[test]
    fn clear_empties_pool() {
        let pool = SurfacePool::new(4);
        pool.release(pool.acquire(2, 2).unwrap());
        assert!(!pool.is_empty());
        pool.clear();
        assert!(pool.is_empty());
    }
}
