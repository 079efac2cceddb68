//! The arena: one owned, contiguous memory region backing the whole
//! filesystem. Allocated and zeroed once, carved into zones per [`Layout`],
//! and released as a whole when the filesystem is torn down.

use zerocopy::{AsBytes, FromZeroes};

use crate::config::*;
use crate::error::{FsError, Result};
use crate::layout::Layout;
use crate::store::BlockStore;
use crate::structs::SuperBlock;

pub struct Arena {
    bytes: Box<[u8]>,
    layout: Layout,
}

impl Arena {
    /// Allocates and zeroes a fresh region for the given layout.
    pub(crate) fn zeroed(layout: Layout) -> Self {
        Self {
            bytes: vec![0u8; layout.total_size].into_boxed_slice(),
            layout,
        }
    }

    /// Re-attaches to a previously built region, e.g. one detached with
    /// [`Arena::into_raw`]. Validates the superblock before trusting any
    /// offset in it.
    pub fn from_raw(bytes: Box<[u8]>) -> Result<Self> {
        if bytes.len() < SUPERBLOCK_SIZE {
            return Err(FsError::InvalidSuperBlock);
        }
        let mut sb = SuperBlock::new_zeroed();
        sb.as_bytes_mut().copy_from_slice(&bytes[..SUPERBLOCK_SIZE]);
        let layout = Layout::from_superblock(&sb)?;
        if bytes.len() != layout.total_size {
            return Err(FsError::InvalidSuperBlock);
        }
        Ok(Self { bytes, layout })
    }

    /// Detaches the raw region, surrendering ownership to the caller.
    pub fn into_raw(self) -> Box<[u8]> {
        self.bytes
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub(crate) fn read_superblock(&self) -> SuperBlock {
        let mut sb = SuperBlock::new_zeroed();
        sb.as_bytes_mut()
            .copy_from_slice(&self.bytes[..SUPERBLOCK_SIZE]);
        sb
    }

    pub(crate) fn write_superblock(&mut self, sb: &SuperBlock) {
        self.bytes[..SUPERBLOCK_SIZE].copy_from_slice(sb.as_bytes());
    }

    pub(crate) fn inode_bitmap_mut(&mut self) -> &mut [u8] {
        let start = self.layout.inode_bitmap_off;
        &mut self.bytes[start..start + self.layout.inode_bitmap_len()]
    }

    pub(crate) fn block_bitmap_mut(&mut self) -> &mut [u8] {
        let start = self.layout.block_bitmap_off;
        &mut self.bytes[start..start + self.layout.block_bitmap_len()]
    }

    /// Borrows the byte image of one inode table slot. `ino` must already be
    /// range-checked by the inode manager.
    pub(crate) fn inode_slot(&self, ino: u32) -> &[u8] {
        debug_assert!(ino < self.layout.inode_count);
        let start = self.layout.inode_slot_off(ino);
        &self.bytes[start..start + INODE_SIZE]
    }

    pub(crate) fn inode_slot_mut(&mut self, ino: u32) -> &mut [u8] {
        debug_assert!(ino < self.layout.inode_count);
        let start = self.layout.inode_slot_off(ino);
        &mut self.bytes[start..start + INODE_SIZE]
    }
}

impl BlockStore for Arena {
    fn num_blocks(&self) -> u32 {
        self.layout.block_count
    }

    fn block(&self, block_no: u32) -> Result<&[u8]> {
        if block_no == NIL_BLOCK || block_no >= self.layout.block_count {
            return Err(FsError::BadBlockPointer(block_no));
        }
        let start = self.layout.data_off + block_no as usize * BLOCK_SIZE;
        Ok(&self.bytes[start..start + BLOCK_SIZE])
    }

    fn block_mut(&mut self, block_no: u32) -> Result<&mut [u8]> {
        if block_no == NIL_BLOCK || block_no >= self.layout.block_count {
            return Err(FsError::BadBlockPointer(block_no));
        }
        let start = self.layout.data_off + block_no as usize * BLOCK_SIZE;
        Ok(&mut self.bytes[start..start + BLOCK_SIZE])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn block_access_is_bounds_checked() {
        let layout = Layout::compute(8, 8).unwrap();
        let mut arena = Arena::zeroed(layout);
        assert_eq!(arena.block(0), Err(FsError::BadBlockPointer(0)));
        assert_eq!(arena.block(8), Err(FsError::BadBlockPointer(8)));
        assert!(arena.block(7).is_ok());
        assert!(arena.block_mut(7).is_ok());
    }

    #[test]
    fn raw_round_trip_requires_valid_superblock() {
        let layout = Layout::compute(8, 8).unwrap();
        let arena = Arena::zeroed(layout);
        // Zeroed region has no magic yet.
        let bytes = arena.into_raw();
        assert!(Arena::from_raw(bytes).is_err());
    }
}
