mod common;

use common::{fresh, mkdir, mkfile};
use quark::{Error, BLOCK_SIZE, MAX_FILE_BLOCKS, ROOT_INO};

#[test]
fn write_read_across_block_boundaries() {
    let mut fs = fresh(8, 32);
    let ino = mkfile(&mut fs, ROOT_INO, "data");

    let payload: Vec<u8> = (0..1200u32).map(|i| (i % 251) as u8).collect();
    assert_eq!(fs.write(ino, 0, &payload).unwrap(), 1200);

    let inode = fs.stat(ino).unwrap();
    assert_eq!(inode.size, 1200);
    assert_eq!(inode.blocks, 3);

    let mut back = vec![0u8; 1200];
    assert_eq!(fs.read(ino, 0, &mut back).unwrap(), 1200);
    assert_eq!(back, payload);

    // A read straddling a block boundary.
    let mut mid = vec![0u8; 100];
    assert_eq!(fs.read(ino, 480, &mut mid).unwrap(), 100);
    assert_eq!(mid, payload[480..580]);

    // Reads clamp at end of file.
    let mut tail = vec![0u8; 100];
    assert_eq!(fs.read(ino, 1150, &mut tail).unwrap(), 50);
    assert_eq!(tail[..50], payload[1150..]);
    assert_eq!(fs.read(ino, 1200, &mut tail).unwrap(), 0);
    assert_eq!(fs.read(ino, 9999, &mut tail).unwrap(), 0);
}

#[test]
fn overwrite_does_not_reallocate() {
    let mut fs = fresh(8, 32);
    let ino = mkfile(&mut fs, ROOT_INO, "data");

    fs.write(ino, 0, &[0xaa; 600]).unwrap();
    let free_before = fs.superblock().free_blocks;
    fs.write(ino, 100, &[0xbb; 400]).unwrap();

    assert_eq!(fs.superblock().free_blocks, free_before);
    let inode = fs.stat(ino).unwrap();
    assert_eq!(inode.size, 600);
    assert_eq!(inode.blocks, 2);
}

#[test]
fn sparse_write_leaves_a_hole() {
    let mut fs = fresh(8, 32);
    let ino = mkfile(&mut fs, ROOT_INO, "sparse");

    // Lands entirely in logical block 3; blocks 0..=2 stay unbacked.
    assert_eq!(fs.write(ino, 2000, b"end").unwrap(), 3);

    let inode = fs.stat(ino).unwrap();
    assert_eq!(inode.size, 2003);
    assert_eq!(inode.blocks, 1);

    let mut back = vec![0xffu8; 2003];
    assert_eq!(fs.read(ino, 0, &mut back).unwrap(), 2003);
    assert!(back[..2000].iter().all(|&b| b == 0));
    assert_eq!(&back[2000..], b"end");
}

#[test]
fn probes_across_every_index_level() {
    let mut fs = fresh(8, 64);
    let ino = mkfile(&mut fs, ROOT_INO, "levels");

    // Last direct, first/last single-indirect, first/second-group/last
    // double-indirect logical blocks.
    let probes: [u64; 7] = [0, 11, 12, 139, 140, 268, MAX_FILE_BLOCKS - 1];
    for (i, &lblock) in probes.iter().enumerate() {
        let byte = [i as u8 + 1];
        assert_eq!(fs.write(ino, lblock * BLOCK_SIZE as u64, &byte).unwrap(), 1);
    }

    for (i, &lblock) in probes.iter().enumerate() {
        let mut byte = [0u8];
        assert_eq!(fs.read(ino, lblock * BLOCK_SIZE as u64, &mut byte).unwrap(), 1);
        assert_eq!(byte[0], i as u8 + 1);
    }

    // 7 leaves, one single-indirect index, one double-indirect root, and
    // three mid-level index blocks.
    assert_eq!(fs.stat(ino).unwrap().blocks, 12);

    // A never-written block inside the extent reads as zeros.
    let mut hole = [0xffu8; 8];
    assert_eq!(fs.read(ino, 5 * BLOCK_SIZE as u64, &mut hole).unwrap(), 8);
    assert_eq!(hole, [0; 8]);
}

#[test]
fn offsets_past_the_pointer_table_are_rejected() {
    let mut fs = fresh(8, 64);
    let ino = mkfile(&mut fs, ROOT_INO, "huge");
    assert_eq!(
        fs.write(ino, MAX_FILE_BLOCKS * BLOCK_SIZE as u64, b"x"),
        Err(Error::FileTooLarge)
    );
}

#[test]
fn remove_reclaims_the_whole_block_graph() {
    let mut fs = fresh(8, 64);
    let ino = mkfile(&mut fs, ROOT_INO, "levels");
    // Baseline taken after the create, which gave the root directory its
    // first block; that block stays allocated across the remove.
    let free_at_start = fs.superblock().free_blocks;

    for lblock in [0u64, 12, 140] {
        fs.write(ino, lblock * BLOCK_SIZE as u64, b"x").unwrap();
    }
    assert!(fs.superblock().free_blocks < free_at_start);

    fs.remove(ROOT_INO, "levels").unwrap();
    assert_eq!(fs.superblock().free_blocks, free_at_start);
}

#[test]
fn block_allocation_is_first_fit() {
    let mut fs = fresh(8, 32);
    let ino = mkfile(&mut fs, ROOT_INO, "a");
    fs.write(ino, 0, b"x").unwrap();
    let first = fs.stat(ino).unwrap().block_ptrs[0];

    fs.remove(ROOT_INO, "a").unwrap();
    let ino = mkfile(&mut fs, ROOT_INO, "b");
    fs.write(ino, 0, b"y").unwrap();

    // The freed block is the lowest free number again.
    assert_eq!(fs.stat(ino).unwrap().block_ptrs[0], first);
}

#[test]
fn write_returns_partial_count_on_exhaustion() {
    let mut fs = fresh(16, 8);
    let ino = mkfile(&mut fs, ROOT_INO, "big");

    // 7 usable blocks, one taken by the root directory; the 7th data chunk
    // has nowhere to go.
    let data = vec![0x5a; 4096];
    assert_eq!(fs.write(ino, 0, &data).unwrap(), 3072);
    assert_eq!(fs.stat(ino).unwrap().size, 3072);

    // With zero progress possible, the error surfaces.
    assert_eq!(fs.write(ino, 3072, &data), Err(Error::NoSpace));

    // Everything that was reported written is readable.
    let mut back = vec![0u8; 4096];
    assert_eq!(fs.read(ino, 0, &mut back).unwrap(), 3072);
    assert!(back[..3072].iter().all(|&b| b == 0x5a));
}

#[test]
fn io_requires_a_regular_file() {
    let mut fs = fresh(8, 32);
    let sub = mkdir(&mut fs, ROOT_INO, "sub");
    let mut buf = [0u8; 4];
    assert_eq!(fs.read(sub, 0, &mut buf), Err(Error::NotFile));
    assert_eq!(fs.write(sub, 0, b"nope"), Err(Error::NotFile));
}

#[test]
fn timestamps_move_with_io() {
    let mut fs = fresh(8, 32);
    let ino = mkfile(&mut fs, ROOT_INO, "stamped");
    let created = fs.stat(ino).unwrap();

    fs.write(ino, 0, b"payload").unwrap();
    let written = fs.stat(ino).unwrap();
    assert!(written.mtime >= created.mtime);

    let mut buf = [0u8; 7];
    fs.read(ino, 0, &mut buf).unwrap();
    let read = fs.stat(ino).unwrap();
    assert!(read.atime >= written.atime);
}
