//! Block index translation: maps a file's logical block number to a physical
//! block number through the inode's pointer table (12 direct slots, one
//! single-indirect slot, one double-indirect slot). Index blocks are ordinary
//! data blocks reinterpreted as arrays of little-endian u32 block numbers,
//! zero-filled before their address is published so that "0 = absent" holds
//! for every slot they carry.

use log::trace;

use crate::arena::Arena;
use crate::bitmap::alloc_block;
use crate::config::*;
use crate::error::{FsError, Result};
use crate::store::BlockStore;
use crate::structs::{Inode, SuperBlock};

/// Pointer-table slot indices in the inode record.
pub(crate) const IDX_INDIRECT: usize = NUM_DIRECT;
pub(crate) const IDX_DINDIRECT: usize = NUM_DIRECT + NUM_INDIRECT;

/// Outcome of a non-allocating translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The logical block is backed by this physical block.
    Block(u32),
    /// No backing block; the region reads as zeros. Covers both an absent
    /// leaf pointer and an absent index block anywhere on the path.
    Hole,
}

fn ptr_at(block: &[u8], idx: usize) -> u32 {
    let off = idx * 4;
    u32::from_le_bytes([block[off], block[off + 1], block[off + 2], block[off + 3]])
}

fn set_ptr_at(block: &mut [u8], idx: usize, value: u32) {
    let off = idx * 4;
    block[off..off + 4].copy_from_slice(&value.to_le_bytes());
}

/// Resolves `lblock` without allocating anything.
pub(crate) fn lookup_block(arena: &Arena, inode: &Inode, lblock: u64) -> Result<Lookup> {
    if lblock >= MAX_FILE_BLOCKS {
        return Err(FsError::FileTooLarge);
    }
    let lblock = lblock as usize;

    if lblock < NUM_DIRECT {
        return Ok(slot_lookup(inode.block_ptrs[lblock]));
    }

    let rest = lblock - NUM_DIRECT;
    if rest < PTRS_PER_BLOCK {
        let index = inode.block_ptrs[IDX_INDIRECT];
        if index == NIL_BLOCK {
            return Ok(Lookup::Hole);
        }
        return Ok(slot_lookup(ptr_at(arena.block(index)?, rest)));
    }

    let rest = rest - PTRS_PER_BLOCK;
    let root = inode.block_ptrs[IDX_DINDIRECT];
    if root == NIL_BLOCK {
        return Ok(Lookup::Hole);
    }
    let mid = ptr_at(arena.block(root)?, rest / PTRS_PER_BLOCK);
    if mid == NIL_BLOCK {
        return Ok(Lookup::Hole);
    }
    Ok(slot_lookup(ptr_at(arena.block(mid)?, rest % PTRS_PER_BLOCK)))
}

fn slot_lookup(ptr: u32) -> Lookup {
    if ptr == NIL_BLOCK {
        Lookup::Hole
    } else {
        Lookup::Block(ptr)
    }
}

/// Resolves `lblock`, allocating the leaf block and any missing index blocks
/// on the way. An index block allocated here is linked into its parent before
/// the next level is attempted, so a later allocation failure never orphans
/// it; the slot it serves simply stays absent.
pub(crate) fn materialize_block(
    arena: &mut Arena,
    sb: &mut SuperBlock,
    inode: &mut Inode,
    lblock: u64,
) -> Result<u32> {
    if lblock >= MAX_FILE_BLOCKS {
        return Err(FsError::FileTooLarge);
    }
    let lblock = lblock as usize;

    if lblock < NUM_DIRECT {
        if inode.block_ptrs[lblock] == NIL_BLOCK {
            let block_no = alloc_block(arena, sb)?;
            inode.block_ptrs[lblock] = block_no;
            inode.blocks += 1;
            trace!("inode {}: direct slot {lblock} -> block {block_no}", inode.ino);
        }
        return Ok(inode.block_ptrs[lblock]);
    }

    let rest = lblock - NUM_DIRECT;
    if rest < PTRS_PER_BLOCK {
        let index = ensure_index_root(arena, sb, inode, IDX_INDIRECT)?;
        return ensure_slot(arena, sb, inode, index, rest, false);
    }

    let rest = rest - PTRS_PER_BLOCK;
    let root = ensure_index_root(arena, sb, inode, IDX_DINDIRECT)?;
    let mid = ensure_slot(arena, sb, inode, root, rest / PTRS_PER_BLOCK, true)?;
    ensure_slot(arena, sb, inode, mid, rest % PTRS_PER_BLOCK, false)
}

/// Makes sure the index block hanging off the given inode slot exists.
fn ensure_index_root(
    arena: &mut Arena,
    sb: &mut SuperBlock,
    inode: &mut Inode,
    slot: usize,
) -> Result<u32> {
    if inode.block_ptrs[slot] == NIL_BLOCK {
        let block_no = alloc_block(arena, sb)?;
        arena.block_mut(block_no)?.fill(0);
        inode.block_ptrs[slot] = block_no;
        inode.blocks += 1;
        trace!("inode {}: index slot {slot} -> block {block_no}", inode.ino);
    }
    Ok(inode.block_ptrs[slot])
}

/// Makes sure slot `idx` of the index block `parent` points at a block,
/// allocating one if absent. `is_index` selects whether the new block is
/// itself a pointer table (zero-filled) or a data leaf (left as-is).
fn ensure_slot(
    arena: &mut Arena,
    sb: &mut SuperBlock,
    inode: &mut Inode,
    parent: u32,
    idx: usize,
    is_index: bool,
) -> Result<u32> {
    let existing = ptr_at(arena.block(parent)?, idx);
    if existing != NIL_BLOCK {
        return Ok(existing);
    }
    let block_no = alloc_block(arena, sb)?;
    if is_index {
        arena.block_mut(block_no)?.fill(0);
    }
    set_ptr_at(arena.block_mut(parent)?, idx, block_no);
    inode.blocks += 1;
    trace!("inode {}: block {parent}[{idx}] -> block {block_no}", inode.ino);
    Ok(block_no)
}

/// Walks one single-indirect index block, yielding its live leaf pointers.
pub(crate) fn index_entries(arena: &Arena, index_block: u32) -> Result<Vec<u32>> {
    let block = arena.block(index_block)?;
    Ok((0..PTRS_PER_BLOCK)
        .map(|i| ptr_at(block, i))
        .filter(|&ptr| ptr != NIL_BLOCK)
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ptr_round_trip() {
        let mut block = [0u8; BLOCK_SIZE];
        set_ptr_at(&mut block, 5, 0xdead_beef);
        assert_eq!(ptr_at(&block, 5), 0xdead_beef);
        assert_eq!(ptr_at(&block, 4), 0);
        assert_eq!(ptr_at(&block, 6), 0);
    }

    #[test]
    fn addressable_range() {
        // 12 direct + 128 single-indirect + 128^2 double-indirect leaves.
        assert_eq!(MAX_FILE_BLOCKS, 12 + 128 + 128 * 128);
    }
}
