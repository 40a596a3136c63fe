//! Page-pool arena allocation for ion-kit.
//!
//! Memory management here follows an owner-rooted model: every non-trivial
//! object is allocated under exactly one [`Owner`], and dropping the owner
//! releases everything ever allocated beneath it in one operation. Backing
//! pages are recycled through a thread-local [`pool`] that is shared with
//! the stream subsystem.
//!
//! # Example
//!
//! ```
//! use ion_kit_arena::Owner;
//!
//! let mut owner = Owner::new();
//! let r = owner.alloc(16);
//! assert!(owner.bytes(r).iter().all(|b| *b == 0));
//! owner.bytes_mut(r)[0] = 0xff;
//! assert_eq!(owner.bytes(r)[0], 0xff);
//! ```

mod owner;
pub mod pool;

pub use owner::{ArenaRef, Owner};
pub use pool::{DEFAULT_FREE_PAGE_LIMIT, DEFAULT_PAGE_SIZE};
