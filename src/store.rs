use crate::error::Result;

/// Bounds-checked access to the data-block area.
///
/// Physical block numbers are validated at this boundary; a pointer read out
/// of a corrupt index block can produce an error here but never an
/// out-of-range memory access.
pub trait BlockStore {
    /// Number of data blocks, including the reserved block 0.
    fn num_blocks(&self) -> u32;

    /// Borrows one data block. `block_no` must be a valid, non-reserved
    /// block number.
    fn block(&self, block_no: u32) -> Result<&[u8]>;

    /// Mutably borrows one data block.
    fn block_mut(&mut self, block_no: u32) -> Result<&mut [u8]>;

    fn block_size(&self) -> usize {
        crate::config::BLOCK_SIZE
    }
}
