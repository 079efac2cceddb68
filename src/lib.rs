//! Quark is a tiny in-memory inode filesystem: a fixed-capacity block device
//! emulated in one contiguous memory region, managed through a superblock,
//! free-space bitmaps, a fixed-size inode table, and multi-level block
//! indexing (12 direct, 1 single-indirect, 1 double-indirect pointer per
//! inode).
//!
//! Linear region layout, carved once at format time:
//! - Superblock
//! - Inode Bitmap
//! - Block Bitmap
//! - Inode Table
//! - Data Blocks
//!
//! Layers, bottom to top:
//! 1. Arena / BlockStore: the owned region, bounds-checked block access.
//! 2. Bitmap: first-fit allocation of inode and block numbers.
//! 3. Index: logical-to-physical block translation with lazy allocation.
//! 4. Inode: record management and block-graph teardown.
//! 5. Directory / File: entry arrays and byte-range I/O.
//! 6. FsCore: the interface a host mounts and drives; the host supplies
//!    path resolution and, if concurrent, its own locking around the core.

mod arena;
mod bitmap;
mod config;
mod directory;
mod error;
mod file;
mod fs;
mod index;
mod inode;
mod layout;
mod store;
mod structs;

pub use arena::Arena;
pub use config::*;
pub use directory::{DirEntryInfo, DirIter};
pub use error::FsError as Error;
pub use error::Result;
pub use fs::FsCore;
pub use layout::Layout;
pub use store::BlockStore;
pub use structs::{DirEntry, FileMode, Inode, SuperBlock, Timespec};
