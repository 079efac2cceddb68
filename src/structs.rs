//! On-region record types. Every record is `#[repr(C)]` with an explicit
//! reserved tail so its byte image is exactly the width `config` promises,
//! and is copied in and out of the arena with zerocopy.

use bitflags::bitflags;
use zerocopy::{AsBytes, FromBytes, FromZeroes};

use crate::config::*;
use crate::error::{FsError, Result};

#[repr(C)]
#[derive(Debug, Clone, Copy, AsBytes, FromBytes, FromZeroes)]
pub struct SuperBlock {
    pub magic: u32,
    pub block_size: u32,
    pub inode_count: u32, // Total inode slots, including the nil sentinel
    pub block_count: u32, // Total data blocks, including the nil sentinel
    pub free_inodes: u32,
    pub free_blocks: u32,
    // Byte offsets of the four zones following the superblock.
    pub inode_bitmap_off: u32,
    pub block_bitmap_off: u32,
    pub inode_table_off: u32,
    pub data_off: u32,
    pub reserved: [u8; SUPERBLOCK_SIZE - 40],
}

const _: () = assert!(core::mem::size_of::<SuperBlock>() == SUPERBLOCK_SIZE);

bitflags! {
    /// File type and permission bits, stored in the inode's mode word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileMode: u32 {
        const REG = 0x8000;
        const DIR = 0x4000;

        const OWNER_READ = 0o400;
        const OWNER_WRITE = 0o200;
        const OWNER_EXEC = 0o100;
        const GROUP_READ = 0o040;
        const GROUP_WRITE = 0o020;
        const GROUP_EXEC = 0o010;
        const OTHER_READ = 0o004;
        const OTHER_WRITE = 0o002;
        const OTHER_EXEC = 0o001;
    }
}

impl FileMode {
    pub fn regular() -> Self {
        Self::REG | Self::from_bits_retain(0o644)
    }

    pub fn directory() -> Self {
        Self::DIR | Self::from_bits_retain(0o755)
    }

    pub fn is_regular(self) -> bool {
        self.contains(Self::REG) && !self.contains(Self::DIR)
    }

    pub fn is_directory(self) -> bool {
        self.contains(Self::DIR) && !self.contains(Self::REG)
    }

    /// Exactly one supported type bit must be set.
    pub fn is_supported(self) -> bool {
        self.is_regular() || self.is_directory()
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, AsBytes, FromBytes, FromZeroes)]
pub struct Timespec {
    pub secs: i64,
    pub nanos: i64,
}

impl Timespec {
    pub fn now() -> Self {
        let elapsed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            secs: elapsed.as_secs() as i64,
            nanos: elapsed.subsec_nanos() as i64,
        }
    }
}

/// Fixed-size inode record, overwritten in place in the inode table and never
/// relocated. A zero in any `block_ptrs` slot means "absent".
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
pub struct Inode {
    pub ino: u32,
    pub mode: u32,
    pub links: u32,
    pub uid: u32,
    pub gid: u32,
    pub parent: u32, // Containing directory; backs the synthetic ".." entry
    pub size: u64,
    pub blocks: u32, // Allocated blocks, index blocks included
    pub _pad: u32,
    pub atime: Timespec,
    pub mtime: Timespec,
    pub ctime: Timespec,
    pub block_ptrs: [u32; NUM_BLOCK_PTRS],
    pub reserved: [u8; 16],
}

const _: () = assert!(core::mem::size_of::<Inode>() == INODE_SIZE);

impl Inode {
    pub fn file_mode(&self) -> FileMode {
        FileMode::from_bits_retain(self.mode)
    }

    pub fn is_directory(&self) -> bool {
        self.file_mode().is_directory()
    }

    pub fn is_regular(&self) -> bool {
        self.file_mode().is_regular()
    }
}

/// One slot in a directory's entry array: NUL-padded name, then the inode
/// number. `ino == 0` marks a free slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
pub struct DirEntry {
    pub name: [u8; MAX_NAME_LEN],
    pub ino: u32,
}

const _: () = assert!(core::mem::size_of::<DirEntry>() == DIR_ENTRY_SIZE);

impl DirEntry {
    pub const EMPTY: Self = Self {
        name: [0; MAX_NAME_LEN],
        ino: NIL_INO,
    };

    pub fn new(name: &[u8], ino: u32) -> Result<Self> {
        if name.is_empty() || name.contains(&0) {
            return Err(FsError::InvalidName);
        }
        if name.len() > MAX_NAME_LEN {
            return Err(FsError::NameTooLong);
        }
        let mut entry = Self::EMPTY;
        entry.name[..name.len()].copy_from_slice(name);
        entry.ino = ino;
        Ok(entry)
    }

    pub fn is_free(&self) -> bool {
        self.ino == NIL_INO
    }

    /// The stored name with trailing NUL padding stripped.
    pub fn name(&self) -> &[u8] {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MAX_NAME_LEN);
        &self.name[..end]
    }

    pub fn name_eq(&self, name: &[u8]) -> bool {
        self.name() == name
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn entry_name_trims_padding() {
        let entry = DirEntry::new(b"notes.txt", 7).unwrap();
        assert_eq!(entry.name(), b"notes.txt");
        assert!(entry.name_eq(b"notes.txt"));
        assert!(!entry.name_eq(b"notes"));
    }

    #[test]
    fn entry_rejects_bad_names() {
        assert_eq!(DirEntry::new(b"", 1), Err(FsError::InvalidName));
        assert_eq!(DirEntry::new(&[b'a'; 61], 1), Err(FsError::NameTooLong));
        assert_eq!(DirEntry::new(b"a\0b", 1), Err(FsError::InvalidName));
    }

    #[test]
    fn mode_type_bits() {
        assert!(FileMode::regular().is_regular());
        assert!(FileMode::directory().is_directory());
        assert!(!FileMode::from_bits_retain(0o644).is_supported());
        assert!(!(FileMode::REG | FileMode::DIR).is_supported());
    }
}
