//! Directory content: a flat, unsorted array of fixed-size entries stored in
//! the directory inode's own block chain. Directories grow through the same
//! block index translation as regular files, so a directory is not capped at
//! one block. Removal punches a free slot (`ino == 0`) that a later insert
//! reuses first-fit; the recorded size is the extent high-water mark and
//! never shrinks.

use log::debug;
use zerocopy::{AsBytes, FromZeroes};

use crate::arena::Arena;
use crate::config::*;
use crate::error::{FsError, Result};
use crate::index::{lookup_block, materialize_block, Lookup};
use crate::store::BlockStore;
use crate::structs::{DirEntry, Inode, SuperBlock};

/// One entry yielded by directory iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub ino: u32,
    pub name: String,
}

fn entry_at(block: &[u8], idx: usize) -> DirEntry {
    let off = idx * DIR_ENTRY_SIZE;
    let mut entry = DirEntry::new_zeroed();
    entry
        .as_bytes_mut()
        .copy_from_slice(&block[off..off + DIR_ENTRY_SIZE]);
    entry
}

fn put_entry(block: &mut [u8], idx: usize, entry: &DirEntry) {
    let off = idx * DIR_ENTRY_SIZE;
    block[off..off + DIR_ENTRY_SIZE].copy_from_slice(entry.as_bytes());
}

fn slot_count(dir: &Inode) -> usize {
    dir.size as usize / DIR_ENTRY_SIZE
}

/// Scans the directory's extent for an occupied entry with this exact name.
fn find_entry(arena: &Arena, dir: &Inode, name: &[u8]) -> Result<Option<(usize, u32)>> {
    let slots = slot_count(dir);
    let mut slot = 0;
    while slot < slots {
        let lblock = (slot / ENTRIES_PER_BLOCK) as u64;
        match lookup_block(arena, dir, lblock)? {
            Lookup::Hole => slot = (slot / ENTRIES_PER_BLOCK + 1) * ENTRIES_PER_BLOCK,
            Lookup::Block(block_no) => {
                let block = arena.block(block_no)?;
                let last = slots.min((slot / ENTRIES_PER_BLOCK + 1) * ENTRIES_PER_BLOCK);
                while slot < last {
                    let entry = entry_at(block, slot % ENTRIES_PER_BLOCK);
                    if !entry.is_free() && entry.name_eq(name) {
                        return Ok(Some((slot, entry.ino)));
                    }
                    slot += 1;
                }
            }
        }
    }
    Ok(None)
}

/// First free slot inside the current extent, if any.
fn find_free_slot(arena: &Arena, dir: &Inode) -> Result<Option<usize>> {
    let slots = slot_count(dir);
    let mut slot = 0;
    while slot < slots {
        let lblock = (slot / ENTRIES_PER_BLOCK) as u64;
        match lookup_block(arena, dir, lblock)? {
            // A hole in the chain means every slot in it is free.
            Lookup::Hole => return Ok(Some(slot)),
            Lookup::Block(block_no) => {
                let block = arena.block(block_no)?;
                let last = slots.min((slot / ENTRIES_PER_BLOCK + 1) * ENTRIES_PER_BLOCK);
                while slot < last {
                    if entry_at(block, slot % ENTRIES_PER_BLOCK).is_free() {
                        return Ok(Some(slot));
                    }
                    slot += 1;
                }
            }
        }
    }
    Ok(None)
}

/// Resolves `name` to an inode number within `dir`.
pub(crate) fn dir_lookup(arena: &Arena, dir: &Inode, name: &[u8]) -> Result<u32> {
    if !dir.is_directory() {
        return Err(FsError::NotDirectory);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(FsError::NameTooLong);
    }
    match find_entry(arena, dir, name)? {
        Some((_, ino)) => Ok(ino),
        None => Err(FsError::NotFound),
    }
}

/// Inserts one entry. Reuses a freed slot when one exists, otherwise appends
/// at the extent end, allocating (and zeroing) a fresh directory block when
/// the append crosses a block boundary.
pub(crate) fn dir_insert(
    arena: &mut Arena,
    sb: &mut SuperBlock,
    dir: &mut Inode,
    name: &[u8],
    ino: u32,
) -> Result<()> {
    if !dir.is_directory() {
        return Err(FsError::NotDirectory);
    }
    let entry = DirEntry::new(name, ino)?;
    if find_entry(arena, dir, name)?.is_some() {
        return Err(FsError::AlreadyExists);
    }

    let slot = match find_free_slot(arena, dir)? {
        Some(slot) => slot,
        None => {
            let slots = slot_count(dir);
            if slots >= MAX_DIR_ENTRIES {
                return Err(FsError::DirectoryFull);
            }
            dir.size += DIR_ENTRY_SIZE as u64;
            slots
        }
    };

    let lblock = (slot / ENTRIES_PER_BLOCK) as u64;
    let fresh = matches!(lookup_block(arena, dir, lblock)?, Lookup::Hole);
    let block_no = materialize_block(arena, sb, dir, lblock)?;
    let block = arena.block_mut(block_no)?;
    if fresh {
        // Free-slot detection depends on zeroed entries; a recycled data
        // block would otherwise present stale bytes as live entries.
        block.fill(0);
    }
    put_entry(block, slot % ENTRIES_PER_BLOCK, &entry);
    debug!(
        "dir {}: inserted {:?} -> inode {ino} at slot {slot}",
        dir.ino,
        String::from_utf8_lossy(name)
    );
    Ok(())
}

/// Removes the entry with this name, returning the inode number it carried.
/// The inode itself is untouched; reclaiming it is the caller's job.
pub(crate) fn dir_remove(arena: &mut Arena, dir: &mut Inode, name: &[u8]) -> Result<u32> {
    if !dir.is_directory() {
        return Err(FsError::NotDirectory);
    }
    let (slot, ino) = find_entry(arena, dir, name)?.ok_or(FsError::NotFound)?;
    let lblock = (slot / ENTRIES_PER_BLOCK) as u64;
    let Lookup::Block(block_no) = lookup_block(arena, dir, lblock)? else {
        return Err(FsError::NotFound);
    };
    put_entry(
        arena.block_mut(block_no)?,
        slot % ENTRIES_PER_BLOCK,
        &DirEntry::EMPTY,
    );
    debug!(
        "dir {}: removed {:?} (inode {ino})",
        dir.ino,
        String::from_utf8_lossy(name)
    );
    Ok(ino)
}

/// True when the directory holds no live entries. The synthetic `.` and `..`
/// do not count; they are never stored.
pub(crate) fn dir_is_empty(arena: &Arena, dir: &Inode) -> Result<bool> {
    let slots = slot_count(dir);
    for slot in 0..slots {
        let lblock = (slot / ENTRIES_PER_BLOCK) as u64;
        match lookup_block(arena, dir, lblock)? {
            Lookup::Hole => continue,
            Lookup::Block(block_no) => {
                if !entry_at(arena.block(block_no)?, slot % ENTRIES_PER_BLOCK).is_free() {
                    return Ok(false);
                }
            }
        }
    }
    Ok(true)
}

/// Lazy directory iteration in storage order, restartable from any position.
/// Positions 0 and 1 are the synthetic `.` and `..` entries; position `p ≥ 2`
/// addresses entry slot `p - 2`, so a position remains stable across
/// restarts even when slots in between are free.
pub struct DirIter<'a> {
    arena: &'a Arena,
    dir: Inode,
    pos: usize,
}

impl<'a> DirIter<'a> {
    pub(crate) fn new(arena: &'a Arena, dir: Inode, start_pos: usize) -> Self {
        Self {
            arena,
            dir,
            pos: start_pos,
        }
    }

    fn slot_entry(&self, slot: usize) -> Result<Option<DirEntry>> {
        let lblock = (slot / ENTRIES_PER_BLOCK) as u64;
        match lookup_block(self.arena, &self.dir, lblock)? {
            Lookup::Hole => Ok(None),
            Lookup::Block(block_no) => {
                let entry = entry_at(self.arena.block(block_no)?, slot % ENTRIES_PER_BLOCK);
                Ok((!entry.is_free()).then_some(entry))
            }
        }
    }
}

impl Iterator for DirIter<'_> {
    type Item = Result<DirEntryInfo>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let pos = self.pos;
            match pos {
                0 => {
                    self.pos = 1;
                    return Some(Ok(DirEntryInfo {
                        ino: self.dir.ino,
                        name: ".".into(),
                    }));
                }
                1 => {
                    self.pos = 2;
                    return Some(Ok(DirEntryInfo {
                        ino: self.dir.parent,
                        name: "..".into(),
                    }));
                }
                _ => {
                    let slot = pos - 2;
                    if slot >= slot_count(&self.dir) {
                        return None;
                    }
                    self.pos += 1;
                    match self.slot_entry(slot) {
                        Ok(None) => continue,
                        Ok(Some(entry)) => {
                            return Some(Ok(DirEntryInfo {
                                ino: entry.ino,
                                name: String::from_utf8_lossy(entry.name()).into_owned(),
                            }));
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }
            }
        }
    }
}
