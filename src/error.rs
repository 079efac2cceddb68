use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("out of free inodes or blocks")]
    NoSpace,
    #[error("not found")]
    NotFound,
    #[error("name already exists")]
    AlreadyExists,
    #[error("name exceeds maximum length")]
    NameTooLong,
    #[error("name is empty or malformed")]
    InvalidName,
    #[error("logical block beyond addressable range")]
    FileTooLarge,
    #[error("invalid inode number")]
    InvalidHandle,
    #[error("physical block {0} out of range")]
    BadBlockPointer(u32),
    #[error("directory entry capacity exhausted")]
    DirectoryFull,
    #[error("directory is not empty")]
    NotEmpty,
    #[error("not a directory")]
    NotDirectory,
    #[error("not a regular file")]
    NotFile,
    #[error("file type not supported")]
    UnsupportedType,
    #[error("region is not a valid filesystem image")]
    InvalidSuperBlock,
    #[error("copy across the caller boundary failed")]
    IoFault,
}

pub type Result<T> = core::result::Result<T, FsError>;
