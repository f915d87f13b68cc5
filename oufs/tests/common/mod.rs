#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use oufs::{BLOCK_SIZE, BlockDevice, BlockError, BlockId, InodeId, N_BLOCKS_IN_DISK, OuFileSystem};

/// 内存里的虚拟磁盘
pub struct RamDisk(Mutex<Vec<u8>>);

impl RamDisk {
    pub fn new() -> Self {
        Self::filled(0)
    }

    pub fn filled(byte: u8) -> Self {
        Self(Mutex::new(vec![byte; N_BLOCKS_IN_DISK * BLOCK_SIZE]))
    }

    pub fn block(&self, id: BlockId) -> Vec<u8> {
        let start = id.index() * BLOCK_SIZE;
        self.0.lock().unwrap()[start..start + BLOCK_SIZE].to_vec()
    }
}

impl BlockDevice for RamDisk {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), BlockError> {
        if block_id >= N_BLOCKS_IN_DISK {
            return Err(BlockError::OutOfRange(block_id));
        }
        let start = block_id * BLOCK_SIZE;
        buf.copy_from_slice(&self.0.lock().unwrap()[start..start + BLOCK_SIZE]);
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), BlockError> {
        if block_id >= N_BLOCKS_IN_DISK {
            return Err(BlockError::OutOfRange(block_id));
        }
        let start = block_id * BLOCK_SIZE;
        self.0.lock().unwrap()[start..start + BLOCK_SIZE].copy_from_slice(buf);
        Ok(())
    }
}

pub fn formatted() -> (Arc<RamDisk>, OuFileSystem) {
    let disk = Arc::new(RamDisk::new());
    let fs = OuFileSystem::format(disk.clone()).unwrap();
    (disk, fs)
}

/// 每个目录块的槽位 0 是指向自己的 `.`，槽位 1 是指向父目录的 `..`
pub fn assert_dir_invariant(fs: &OuFileSystem, dir: InodeId, parent: InodeId) {
    let inode = fs.read_inode(dir).unwrap();
    assert!(inode.is_dir());

    let block = fs.read_dir(inode.direct[0]).unwrap();
    let entries = block.entries();
    assert_eq!(entries[0].name(), ".");
    assert_eq!(entries[0].inode(), dir);
    assert_eq!(entries[1].name(), "..");
    assert_eq!(entries[1].inode(), parent);
    assert_eq!(inode.size as usize, block.live().count());
}

/// 可辨认的测试数据
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8 + 1).collect()
}

/// 占满剩下的所有块，返回占到的块
pub fn drain_blocks(fs: &OuFileSystem) -> Vec<BlockId> {
    core::iter::from_fn(|| fs.alloc_block().ok()).collect()
}
