//! Byte-range file I/O over an inode's block chain. Both directions walk the
//! covered logical blocks one at a time, splitting at block boundaries; a
//! failure after progress has been made yields the partial count instead of
//! an error.

use crate::arena::Arena;
use crate::config::BLOCK_SIZE;
use crate::error::Result;
use crate::index::{lookup_block, materialize_block, Lookup};
use crate::store::BlockStore;
use crate::structs::{Inode, SuperBlock, Timespec};

fn read_chunk(arena: &Arena, inode: &Inode, lblock: u64, in_off: usize, out: &mut [u8]) -> Result<()> {
    match lookup_block(arena, inode, lblock)? {
        Lookup::Block(block_no) => {
            let block = arena.block(block_no)?;
            out.copy_from_slice(&block[in_off..in_off + out.len()]);
        }
        // Unbacked region: zero-fill.
        Lookup::Hole => out.fill(0),
    }
    Ok(())
}

/// Reads into `buf` starting at `offset`, clamped to the recorded size.
/// Returns the number of bytes transferred.
pub(crate) fn read_at(arena: &Arena, inode: &Inode, offset: u64, buf: &mut [u8]) -> Result<usize> {
    if inode.blocks == 0 || offset >= inode.size {
        return Ok(0);
    }
    let len = buf.len().min((inode.size - offset) as usize);
    let mut done = 0;
    while done < len {
        let pos = offset + done as u64;
        let in_off = (pos % BLOCK_SIZE as u64) as usize;
        let chunk = (BLOCK_SIZE - in_off).min(len - done);
        let lblock = pos / BLOCK_SIZE as u64;
        match read_chunk(arena, inode, lblock, in_off, &mut buf[done..done + chunk]) {
            Ok(()) => done += chunk,
            Err(_) if done > 0 => return Ok(done),
            Err(e) => return Err(e),
        }
    }
    Ok(len)
}

fn write_chunk(
    arena: &mut Arena,
    sb: &mut SuperBlock,
    inode: &mut Inode,
    lblock: u64,
    in_off: usize,
    data: &[u8],
) -> Result<()> {
    let block_no = materialize_block(arena, sb, inode, lblock)?;
    let block = arena.block_mut(block_no)?;
    block[in_off..in_off + data.len()].copy_from_slice(data);
    Ok(())
}

/// Writes `data` at `offset`, materializing blocks on demand. On allocator
/// exhaustion mid-write the count written so far is returned; the error only
/// surfaces when nothing was written. Extends the recorded size when the
/// write ends past it and refreshes mtime/ctime when any byte landed.
pub(crate) fn write_at(
    arena: &mut Arena,
    sb: &mut SuperBlock,
    inode: &mut Inode,
    offset: u64,
    data: &[u8],
) -> Result<usize> {
    if data.is_empty() {
        return Ok(0);
    }
    let mut done = 0;
    while done < data.len() {
        let pos = offset + done as u64;
        let in_off = (pos % BLOCK_SIZE as u64) as usize;
        let chunk = (BLOCK_SIZE - in_off).min(data.len() - done);
        let lblock = pos / BLOCK_SIZE as u64;
        match write_chunk(arena, sb, inode, lblock, in_off, &data[done..done + chunk]) {
            Ok(()) => done += chunk,
            Err(_) if done > 0 => break,
            Err(e) => return Err(e),
        }
    }

    let end = offset + done as u64;
    if end > inode.size {
        inode.size = end;
    }
    let now = Timespec::now();
    inode.mtime = now;
    inode.ctime = now;
    Ok(done)
}
