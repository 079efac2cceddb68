//! Inode management: fixed-size records in the inode table zone, copied out
//! for inspection and written back in place. Records are never relocated; an
//! inode number is the only handle external code holds.

use log::debug;
use zerocopy::{AsBytes, FromZeroes};

use crate::arena::Arena;
use crate::bitmap::{alloc_inode_id, free_block, free_inode_id};
use crate::config::*;
use crate::error::{FsError, Result};
use crate::index::{index_entries, IDX_DINDIRECT, IDX_INDIRECT};
use crate::structs::{FileMode, Inode, SuperBlock, Timespec};

/// Fetches a copy of an inode record. Fails with `InvalidHandle` for the nil
/// inode or a number beyond the table.
pub(crate) fn get_inode(arena: &Arena, ino: u32) -> Result<Inode> {
    if ino == NIL_INO || ino >= arena.layout().inode_count {
        return Err(FsError::InvalidHandle);
    }
    let mut inode = Inode::new_zeroed();
    inode.as_bytes_mut().copy_from_slice(arena.inode_slot(ino));
    Ok(inode)
}

/// Writes an inode record back into its table slot.
pub(crate) fn write_inode(arena: &mut Arena, inode: &Inode) -> Result<()> {
    if inode.ino == NIL_INO || inode.ino >= arena.layout().inode_count {
        return Err(FsError::InvalidHandle);
    }
    arena
        .inode_slot_mut(inode.ino)
        .copy_from_slice(inode.as_bytes());
    Ok(())
}

/// Allocates and initializes a fresh inode of the given mode. Directories
/// start at size 0 with no blocks; their first block is allocated lazily on
/// the first entry insertion. The parent directory entry is the caller's
/// responsibility.
pub(crate) fn new_inode(
    arena: &mut Arena,
    sb: &mut SuperBlock,
    mode: FileMode,
    parent: u32,
) -> Result<Inode> {
    if !mode.is_supported() {
        return Err(FsError::UnsupportedType);
    }
    let ino = alloc_inode_id(arena, sb)?;
    let now = Timespec::now();
    let inode = Inode {
        ino,
        mode: mode.bits(),
        links: if mode.is_directory() { 2 } else { 1 },
        uid: 0,
        gid: 0,
        parent,
        size: 0,
        blocks: 0,
        _pad: 0,
        atime: now,
        mtime: now,
        ctime: now,
        block_ptrs: [NIL_BLOCK; NUM_BLOCK_PTRS],
        reserved: [0; 16],
    };
    write_inode(arena, &inode)?;
    Ok(inode)
}

/// Tears down an inode's entire block graph: every direct block, every leaf
/// behind the single-indirect block plus the index block itself, and both
/// levels of the double-indirect structure. Nothing else reclaims blocks, so
/// skipping any level here would leak space permanently.
pub(crate) fn free_inode_blocks(
    arena: &mut Arena,
    sb: &mut SuperBlock,
    inode: &mut Inode,
) -> Result<()> {
    for slot in 0..NUM_DIRECT {
        if inode.block_ptrs[slot] != NIL_BLOCK {
            free_block(arena, sb, inode.block_ptrs[slot])?;
            inode.block_ptrs[slot] = NIL_BLOCK;
        }
    }

    if inode.block_ptrs[IDX_INDIRECT] != NIL_BLOCK {
        let index = inode.block_ptrs[IDX_INDIRECT];
        for leaf in index_entries(arena, index)? {
            free_block(arena, sb, leaf)?;
        }
        free_block(arena, sb, index)?;
        inode.block_ptrs[IDX_INDIRECT] = NIL_BLOCK;
    }

    if inode.block_ptrs[IDX_DINDIRECT] != NIL_BLOCK {
        let root = inode.block_ptrs[IDX_DINDIRECT];
        for mid in index_entries(arena, root)? {
            for leaf in index_entries(arena, mid)? {
                free_block(arena, sb, leaf)?;
            }
            free_block(arena, sb, mid)?;
        }
        free_block(arena, sb, root)?;
        inode.block_ptrs[IDX_DINDIRECT] = NIL_BLOCK;
    }

    inode.blocks = 0;
    inode.size = 0;
    Ok(())
}

/// Destroys an inode outright: block graph, table record, and bitmap bit.
/// The number becomes reusable by the next allocation.
pub(crate) fn free_inode(arena: &mut Arena, sb: &mut SuperBlock, inode: &mut Inode) -> Result<()> {
    free_inode_blocks(arena, sb, inode)?;
    arena.inode_slot_mut(inode.ino).fill(0);
    free_inode_id(arena, sb, inode.ino)?;
    debug!("destroyed inode {}", inode.ino);
    Ok(())
}
