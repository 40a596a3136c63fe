//! Thread-local free-page pool.
//!
//! Pages serve both the arena and the paged stream; releasing on either
//! side makes the page available to the other. The pool is per-thread and
//! lock-free. It can be re-parameterized with [`init`] any number of times
//! before the first page is served, and never afterwards.

use std::cell::RefCell;

/// Default page size: 64 KiB.
pub const DEFAULT_PAGE_SIZE: usize = 64 * 1024;

/// Default cap on retained free pages.
pub const DEFAULT_FREE_PAGE_LIMIT: usize = 64;

struct PoolState {
    page_size: usize,
    free_limit: usize,
    free: Vec<Box<[u8]>>,
    used: bool,
}

thread_local! {
    static POOL: RefCell<PoolState> = RefCell::new(PoolState {
        page_size: DEFAULT_PAGE_SIZE,
        free_limit: DEFAULT_FREE_PAGE_LIMIT,
        free: Vec::new(),
        used: false,
    });
}

/// Configures the pool for this thread.
///
/// Returns `true` if the configuration was applied. Once the pool has
/// served a page the call is a no-op and returns `false`.
pub fn init(page_size: usize, free_page_limit: usize) -> bool {
    POOL.with(|p| {
        let mut p = p.borrow_mut();
        if p.used {
            return false;
        }
        p.page_size = page_size.max(64);
        p.free_limit = free_page_limit;
        true
    })
}

/// The configured page size for this thread.
pub fn page_size() -> usize {
    POOL.with(|p| p.borrow().page_size)
}

/// Number of free pages currently retained.
pub fn free_pages() -> usize {
    POOL.with(|p| p.borrow().free.len())
}

/// Fetches a zeroed page, reusing a retained one when available.
pub fn acquire() -> Box<[u8]> {
    POOL.with(|p| {
        let mut p = p.borrow_mut();
        p.used = true;
        match p.free.pop() {
            Some(page) => page,
            None => vec![0u8; p.page_size].into_boxed_slice(),
        }
    })
}

/// Returns a page to the pool.
///
/// The page is zeroed before it is retained so the next `acquire` hands out
/// clean memory. Pages of a stale size, or past the free-page cap, go back
/// to the system allocator instead.
pub fn release(mut page: Box<[u8]>) {
    POOL.with(|p| {
        let mut p = p.borrow_mut();
        if page.len() == p.page_size && p.free.len() < p.free_limit {
            page.fill(0);
            p.free.push(page);
        }
    })
}
