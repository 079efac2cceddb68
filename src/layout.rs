//! Zone offsets for the five-zone region, computed once at format time and
//! immutable for the filesystem's lifetime:
//!
//! `[superblock][inode bitmap][block bitmap][inode table][data blocks]`

use crate::config::*;
use crate::error::{FsError, Result};
use crate::structs::SuperBlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub inode_count: u32,
    pub block_count: u32,
    pub inode_bitmap_off: usize,
    pub block_bitmap_off: usize,
    pub inode_table_off: usize,
    pub data_off: usize,
    pub total_size: usize,
}

fn bitmap_bytes(items: u32) -> usize {
    (items as usize).div_ceil(8)
}

impl Layout {
    /// Carves the region for `inode_count` inode slots and `block_count` data
    /// blocks, both counts including the reserved number 0.
    pub fn compute(inode_count: u32, block_count: u32) -> Result<Self> {
        if inode_count < MIN_INODES || block_count < MIN_BLOCKS {
            return Err(FsError::InvalidSuperBlock);
        }
        let inode_bitmap_off = SUPERBLOCK_SIZE;
        let block_bitmap_off = inode_bitmap_off + bitmap_bytes(inode_count);
        let inode_table_off = block_bitmap_off + bitmap_bytes(block_count);
        let data_off = inode_table_off + inode_count as usize * INODE_SIZE;
        let total_size = data_off + block_count as usize * BLOCK_SIZE;
        Ok(Self {
            inode_count,
            block_count,
            inode_bitmap_off,
            block_bitmap_off,
            inode_table_off,
            data_off,
            total_size,
        })
    }

    /// Rebuilds the layout recorded in a superblock, for mounting an existing
    /// region. The offsets must match a fresh computation exactly.
    pub fn from_superblock(sb: &SuperBlock) -> Result<Self> {
        if sb.magic != MAGIC || sb.block_size != BLOCK_SIZE as u32 {
            return Err(FsError::InvalidSuperBlock);
        }
        let layout = Self::compute(sb.inode_count, sb.block_count)?;
        let matches = sb.inode_bitmap_off as usize == layout.inode_bitmap_off
            && sb.block_bitmap_off as usize == layout.block_bitmap_off
            && sb.inode_table_off as usize == layout.inode_table_off
            && sb.data_off as usize == layout.data_off;
        if !matches {
            return Err(FsError::InvalidSuperBlock);
        }
        Ok(layout)
    }

    pub fn inode_bitmap_len(&self) -> usize {
        bitmap_bytes(self.inode_count)
    }

    pub fn block_bitmap_len(&self) -> usize {
        bitmap_bytes(self.block_count)
    }

    /// Byte offset of an inode record slot. Callers validate `ino`.
    pub fn inode_slot_off(&self, ino: u32) -> usize {
        self.inode_table_off + ino as usize * INODE_SIZE
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zones_are_back_to_back() {
        let layout = Layout::compute(20, 20).unwrap();
        assert_eq!(layout.inode_bitmap_off, SUPERBLOCK_SIZE);
        assert_eq!(layout.block_bitmap_off, layout.inode_bitmap_off + 3);
        assert_eq!(layout.inode_table_off, layout.block_bitmap_off + 3);
        assert_eq!(layout.data_off, layout.inode_table_off + 20 * INODE_SIZE);
        assert_eq!(layout.total_size, layout.data_off + 20 * BLOCK_SIZE);
    }

    #[test]
    fn tiny_capacities_are_rejected() {
        assert_eq!(Layout::compute(1, 20), Err(FsError::InvalidSuperBlock));
        assert_eq!(Layout::compute(20, 1), Err(FsError::InvalidSuperBlock));
    }
}
