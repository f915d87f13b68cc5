//! 主块
//!
//! 块 0 上依次存放 inode 位图与块位图，每一位对应一个 inode 或块，
//! 置 1 表示已分配。

use crate::Resource;
use crate::block_buf::OnDisk;
use crate::{N_BLOCKS_IN_DISK, N_INODES};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterBlock {
    pub inode_allocated: [u8; N_INODES.div_ceil(8)],
    pub block_allocated: [u8; N_BLOCKS_IN_DISK.div_ceil(8)],
}

unsafe impl OnDisk for MasterBlock {}

/// 一张位图的可变视图
///
/// 位图按字节存放，字节内低位在前；
/// 最后一个字节里超出 `capacity` 的位永远不会被分配。
pub struct Bitmap<'a> {
    bits: &'a mut [u8],
    capacity: usize,
}

impl MasterBlock {
    #[inline]
    pub fn bitmap(&mut self, resource: Resource) -> Bitmap<'_> {
        match resource {
            Resource::Inode => Bitmap::new(&mut self.inode_allocated, N_INODES),
            Resource::Block => Bitmap::new(&mut self.block_allocated, N_BLOCKS_IN_DISK),
        }
    }

    pub fn is_allocated(&self, resource: Resource, index: usize) -> bool {
        let bits: &[u8] = match resource {
            Resource::Inode => &self.inode_allocated,
            Resource::Block => &self.block_allocated,
        };
        bits.get(index / 8)
            .is_some_and(|&byte| byte & (1 << (index % 8)) != 0)
    }
}

impl<'a> Bitmap<'a> {
    #[inline]
    pub fn new(bits: &'a mut [u8], capacity: usize) -> Self {
        debug_assert!(capacity <= bits.len() * 8);
        Self { bits, capacity }
    }

    /// 占用编号最小的空闲位并返回其编号；位图用尽则返回空。
    pub fn alloc(&mut self) -> Option<usize> {
        // 逐字节寻找还有 0 的字节，再取其中最低的 0 位
        let (byte_index, bit_index) =
            self.bits.iter().enumerate().find_map(|(byte_index, &bits)| {
                (bits != u8::MAX).then_some((byte_index, bits.trailing_ones() as usize))
            })?;

        let index = byte_index * 8 + bit_index;
        if index >= self.capacity {
            return None;
        }

        self.bits[byte_index] |= 1 << bit_index;
        Some(index)
    }

    #[inline]
    pub fn set(&mut self, index: usize) {
        assert!(index < self.capacity);
        self.bits[index / 8] |= 1 << (index % 8);
    }

    /// 清除一位，返回它原先是否被占用
    pub fn dealloc(&mut self, index: usize) -> bool {
        if index >= self.capacity {
            return false;
        }

        let mask = 1 << (index % 8);
        let was_set = self.bits[index / 8] & mask != 0;
        self.bits[index / 8] &= !mask;
        was_set
    }
}
