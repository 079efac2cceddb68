//! The host-facing surface: format/mount/unmount plus inode-number based
//! create/lookup/remove, byte-range read/write, and directory iteration.
//! Path string resolution belongs to the host layer above this crate.
//!
//! `FsCore` takes `&mut self` for every mutating call, so "one mutator at a
//! time" (and linearized allocator access with it) is enforced by the borrow
//! checker rather than by convention. A concurrent host wraps the core in
//! its own lock.

use log::info;

use crate::arena::Arena;
use crate::config::*;
use crate::directory::{dir_insert, dir_is_empty, dir_lookup, dir_remove, DirIter};
use crate::error::{FsError, Result};
use crate::file::{read_at, write_at};
use crate::inode::{free_inode, get_inode, new_inode, write_inode};
use crate::layout::Layout;
use crate::structs::{FileMode, Inode, SuperBlock, Timespec};

pub struct FsCore {
    arena: Arena,
    superblock: SuperBlock,
}

impl FsCore {
    /// Builds a fresh filesystem: allocates and zeroes the arena, writes the
    /// superblock, reserves the sentinel numbers, and creates the root
    /// directory (link count 2, no entries).
    pub fn format(inode_count: u32, block_count: u32) -> Result<Self> {
        let layout = Layout::compute(inode_count, block_count)?;
        let mut arena = Arena::zeroed(layout);
        let superblock = SuperBlock {
            magic: MAGIC,
            block_size: BLOCK_SIZE as u32,
            inode_count,
            block_count,
            free_inodes: inode_count - 2, // nil sentinel + root
            free_blocks: block_count - 1, // nil sentinel
            inode_bitmap_off: layout.inode_bitmap_off as u32,
            block_bitmap_off: layout.block_bitmap_off as u32,
            inode_table_off: layout.inode_table_off as u32,
            data_off: layout.data_off as u32,
            reserved: [0; SUPERBLOCK_SIZE - 40],
        };
        arena.write_superblock(&superblock);
        crate::bitmap::reserve_fixed_bits(&mut arena);

        let now = Timespec::now();
        let root = Inode {
            ino: ROOT_INO,
            mode: FileMode::directory().bits(),
            links: 2,
            uid: 0,
            gid: 0,
            parent: ROOT_INO,
            size: 0,
            blocks: 0,
            _pad: 0,
            atime: now,
            mtime: now,
            ctime: now,
            block_ptrs: [NIL_BLOCK; NUM_BLOCK_PTRS],
            reserved: [0; 16],
        };
        write_inode(&mut arena, &root)?;

        info!(
            "formatted: {inode_count} inodes, {block_count} blocks, {} bytes",
            layout.total_size
        );
        Ok(Self { arena, superblock })
    }

    /// Re-attaches to an existing arena, e.g. one handed back by
    /// [`FsCore::unmount`] or rebuilt with [`Arena::from_raw`].
    pub fn mount(arena: Arena) -> Result<Self> {
        let superblock = arena.read_superblock();
        if superblock.magic != MAGIC || superblock.block_size != BLOCK_SIZE as u32 {
            return Err(FsError::InvalidSuperBlock);
        }
        info!(
            "mounted: {} inodes ({} free), {} blocks ({} free)",
            superblock.inode_count,
            superblock.free_inodes,
            superblock.block_count,
            superblock.free_blocks
        );
        Ok(Self { arena, superblock })
    }

    /// Detaches the arena. All state lives in it, so mounting it again
    /// resumes exactly where this left off. Dropping the core instead
    /// releases the whole region.
    pub fn unmount(self) -> Arena {
        self.arena
    }

    pub fn root_ino(&self) -> u32 {
        ROOT_INO
    }

    pub fn superblock(&self) -> &SuperBlock {
        &self.superblock
    }

    /// A copy of the inode record, for metadata inspection.
    pub fn stat(&self, ino: u32) -> Result<Inode> {
        get_inode(&self.arena, ino)
    }

    /// Creates a file or directory under `parent`. The mode's type bits pick
    /// which; anything other than exactly one supported type is rejected.
    pub fn create(&mut self, parent: u32, name: &str, mode: FileMode) -> Result<u32> {
        let mut dir = get_inode(&self.arena, parent)?;
        if !dir.is_directory() {
            return Err(FsError::NotDirectory);
        }
        match dir_lookup(&self.arena, &dir, name.as_bytes()) {
            Ok(_) => return Err(FsError::AlreadyExists),
            Err(FsError::NotFound) => {}
            Err(e) => return Err(e),
        }

        let mut inode = new_inode(&mut self.arena, &mut self.superblock, mode, parent)?;
        if let Err(e) = dir_insert(
            &mut self.arena,
            &mut self.superblock,
            &mut dir,
            name.as_bytes(),
            inode.ino,
        ) {
            // The fresh inode owns no blocks yet; take it back out. The
            // directory must still be persisted: an index block materialized
            // for the append is already linked into its chain.
            let _ = free_inode(&mut self.arena, &mut self.superblock, &mut inode);
            write_inode(&mut self.arena, &dir)?;
            return Err(e);
        }

        if mode.is_directory() {
            dir.links += 1; // the child's synthetic ".."
        }
        let now = Timespec::now();
        dir.mtime = now;
        dir.ctime = now;
        write_inode(&mut self.arena, &dir)?;
        Ok(inode.ino)
    }

    /// Resolves `name` within the directory `parent`.
    pub fn lookup(&self, parent: u32, name: &str) -> Result<u32> {
        let dir = get_inode(&self.arena, parent)?;
        dir_lookup(&self.arena, &dir, name.as_bytes())
    }

    /// Removes `name` from `parent`. A regular file loses one link and is
    /// destroyed when none remain; a directory must be empty and is
    /// destroyed outright, its whole block graph returned to the allocator.
    pub fn remove(&mut self, parent: u32, name: &str) -> Result<()> {
        let mut dir = get_inode(&self.arena, parent)?;
        let ino = dir_lookup(&self.arena, &dir, name.as_bytes())?;
        let mut inode = get_inode(&self.arena, ino)?;
        if inode.is_directory() && !dir_is_empty(&self.arena, &inode)? {
            return Err(FsError::NotEmpty);
        }

        dir_remove(&mut self.arena, &mut dir, name.as_bytes())?;

        if inode.is_directory() {
            dir.links = dir.links.saturating_sub(1);
            free_inode(&mut self.arena, &mut self.superblock, &mut inode)?;
        } else {
            inode.links = inode.links.saturating_sub(1);
            if inode.links == 0 {
                free_inode(&mut self.arena, &mut self.superblock, &mut inode)?;
            } else {
                inode.ctime = Timespec::now();
                write_inode(&mut self.arena, &inode)?;
            }
        }

        let now = Timespec::now();
        dir.mtime = now;
        dir.ctime = now;
        write_inode(&mut self.arena, &dir)?;
        Ok(())
    }

    /// Reads file content at `offset`; holes read as zeros. Returns the
    /// bytes transferred, 0 at or past end of file.
    pub fn read(&mut self, ino: u32, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let mut inode = get_inode(&self.arena, ino)?;
        if !inode.is_regular() {
            return Err(FsError::NotFile);
        }
        let n = read_at(&self.arena, &inode, offset, buf)?;
        inode.atime = Timespec::now();
        write_inode(&mut self.arena, &inode)?;
        Ok(n)
    }

    /// Writes file content at `offset`, growing the file as needed. May
    /// return a short count when space runs out mid-write.
    pub fn write(&mut self, ino: u32, offset: u64, data: &[u8]) -> Result<usize> {
        let mut inode = get_inode(&self.arena, ino)?;
        if !inode.is_regular() {
            return Err(FsError::NotFile);
        }
        let res = write_at(
            &mut self.arena,
            &mut self.superblock,
            &mut inode,
            offset,
            data,
        );
        // Persist metadata even on failure: an index block allocated before
        // the error is linked into the chain and must stay that way.
        write_inode(&mut self.arena, &inode)?;
        res
    }

    /// Iterates a directory in storage order from `start_pos`. Positions 0
    /// and 1 are the synthetic `.` and `..` entries.
    pub fn read_dir(&self, ino: u32, start_pos: usize) -> Result<DirIter<'_>> {
        let dir = get_inode(&self.arena, ino)?;
        if !dir.is_directory() {
            return Err(FsError::NotDirectory);
        }
        Ok(DirIter::new(&self.arena, dir, start_pos))
    }
}
