//! Free-space accounting for inode numbers and data-block numbers: one bit
//! per resource, bit set means allocated. Allocation is a linear first-fit
//! scan, freeing is O(1). Both scans start at index 1, so the allocator can
//! never hand out number 0 and "0 = absent" stays valid at every level of
//! the pointer tables.

use log::debug;

use crate::arena::Arena;
use crate::error::{FsError, Result};
use crate::structs::SuperBlock;

fn test_bit(bits: &[u8], index: u32) -> bool {
    bits[index as usize / 8] & (1 << (index % 8)) != 0
}

fn set_bit(bits: &mut [u8], index: u32) {
    bits[index as usize / 8] |= 1 << (index % 8);
}

fn clear_bit(bits: &mut [u8], index: u32) {
    bits[index as usize / 8] &= !(1 << (index % 8));
}

fn first_clear(bits: &[u8], start: u32, total: u32) -> Option<u32> {
    (start..total).find(|&i| !test_bit(bits, i))
}

/// Claims the lowest free inode number. Never returns 0.
pub(crate) fn alloc_inode_id(arena: &mut Arena, sb: &mut SuperBlock) -> Result<u32> {
    let total = sb.inode_count;
    let bits = arena.inode_bitmap_mut();
    let ino = first_clear(bits, 1, total).ok_or(FsError::NoSpace)?;
    set_bit(bits, ino);
    sb.free_inodes -= 1;
    arena.write_superblock(sb);
    debug!("allocated inode {ino}, {} free", sb.free_inodes);
    Ok(ino)
}

/// Releases an inode number for reuse. The caller must have torn down the
/// inode's block graph first.
pub(crate) fn free_inode_id(arena: &mut Arena, sb: &mut SuperBlock, ino: u32) -> Result<()> {
    if ino == 0 || ino >= sb.inode_count {
        return Err(FsError::InvalidHandle);
    }
    let bits = arena.inode_bitmap_mut();
    debug_assert!(test_bit(bits, ino), "double free of inode {ino}");
    clear_bit(bits, ino);
    sb.free_inodes += 1;
    arena.write_superblock(sb);
    debug!("freed inode {ino}, {} free", sb.free_inodes);
    Ok(())
}

/// Claims the lowest free data block. Never returns 0. The block's contents
/// are whatever a previous owner left there; callers that reinterpret a block
/// as a pointer table must zero-fill it before publishing its address.
pub(crate) fn alloc_block(arena: &mut Arena, sb: &mut SuperBlock) -> Result<u32> {
    let total = sb.block_count;
    let bits = arena.block_bitmap_mut();
    let block_no = first_clear(bits, 1, total).ok_or(FsError::NoSpace)?;
    set_bit(bits, block_no);
    sb.free_blocks -= 1;
    arena.write_superblock(sb);
    debug!("allocated block {block_no}, {} free", sb.free_blocks);
    Ok(block_no)
}

/// Releases a data block for reuse.
pub(crate) fn free_block(arena: &mut Arena, sb: &mut SuperBlock, block_no: u32) -> Result<()> {
    if block_no == 0 || block_no >= sb.block_count {
        return Err(FsError::BadBlockPointer(block_no));
    }
    let bits = arena.block_bitmap_mut();
    debug_assert!(test_bit(bits, block_no), "double free of block {block_no}");
    clear_bit(bits, block_no);
    sb.free_blocks += 1;
    arena.write_superblock(sb);
    Ok(())
}

/// Marks the reserved number 0 (and for inodes, the root) as taken at format
/// time, so the free counters stay consistent with the bit population.
pub(crate) fn reserve_fixed_bits(arena: &mut Arena) {
    set_bit(arena.inode_bitmap_mut(), 0);
    set_bit(arena.inode_bitmap_mut(), crate::config::ROOT_INO);
    set_bit(arena.block_bitmap_mut(), 0);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bit_ops() {
        let mut bits = [0u8; 4];
        assert!(!test_bit(&bits, 9));
        set_bit(&mut bits, 9);
        assert!(test_bit(&bits, 9));
        assert_eq!(first_clear(&bits, 9, 32), Some(10));
        clear_bit(&mut bits, 9);
        assert_eq!(first_clear(&bits, 9, 32), Some(9));
    }

    #[test]
    fn first_clear_respects_total() {
        let bits = [0xffu8];
        assert_eq!(first_clear(&bits, 1, 8), None);
    }
}
