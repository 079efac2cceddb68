pub const MAGIC: u32 = 0x5155_4152; // "QUAR" in ASCII

pub const BLOCK_SIZE: usize = 512;
pub const SUPERBLOCK_SIZE: usize = 64;
pub const INODE_SIZE: usize = 160;

/// Inode 0 is never handed out; handle value 0 means "absent".
pub const NIL_INO: u32 = 0;
/// Block 0 is never handed out; a zero slot in any pointer table means "hole".
pub const NIL_BLOCK: u32 = 0;
/// The root directory, pre-allocated at format time.
pub const ROOT_INO: u32 = 1;

pub const NUM_DIRECT: usize = 12; // Direct pointer slots in an inode
pub const NUM_INDIRECT: usize = 1; // Single-indirect slots
pub const NUM_DINDIRECT: usize = 1; // Double-indirect slots
pub const NUM_BLOCK_PTRS: usize = NUM_DIRECT + NUM_INDIRECT + NUM_DINDIRECT;
pub const PTRS_PER_BLOCK: usize = BLOCK_SIZE / 4; // 32-bit block pointers

/// Largest logical block number + 1 addressable through the pointer table.
pub const MAX_FILE_BLOCKS: u64 =
    NUM_DIRECT as u64 + PTRS_PER_BLOCK as u64 + (PTRS_PER_BLOCK * PTRS_PER_BLOCK) as u64;

pub const DIR_ENTRY_SIZE: usize = 64; // Name field plus a 32-bit inode number
pub const MAX_NAME_LEN: usize = DIR_ENTRY_SIZE - 4;
pub const ENTRIES_PER_BLOCK: usize = BLOCK_SIZE / DIR_ENTRY_SIZE;
pub const MAX_DIR_ENTRIES: usize = 512; // Per-directory entry cap

pub const MIN_INODES: u32 = 2; // Nil sentinel + root
pub const MIN_BLOCKS: u32 = 2; // Nil sentinel + at least one usable block
