//! Shared helpers for the integration tests.
#![allow(dead_code)]

use quark::{FileMode, FsCore};

pub fn fresh(inodes: u32, blocks: u32) -> FsCore {
    FsCore::format(inodes, blocks).expect("format")
}

pub fn mkfile(fs: &mut FsCore, parent: u32, name: &str) -> u32 {
    fs.create(parent, name, FileMode::regular()).expect("create file")
}

pub fn mkdir(fs: &mut FsCore, parent: u32, name: &str) -> u32 {
    fs.create(parent, name, FileMode::directory()).expect("create dir")
}

/// Names of the live entries in a directory, in storage order, dots skipped.
pub fn names(fs: &FsCore, dir: u32) -> Vec<String> {
    fs.read_dir(dir, 2)
        .expect("read_dir")
        .map(|e| e.expect("entry").name)
        .collect()
}
