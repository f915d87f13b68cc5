//! # 块设备接口层
//!
//! 块设备是以**块**为单位存储数据的设备，例如磁盘、U盘，
//! 或者宿主机上的一个普通文件；[`BlockDevice`] 就是对读写块设备的抽象，
//! 实现了此特质的类型称为**块设备驱动**。
//!
//! 与内核里的驱动不同，这里的读写都可能失败，失败以 [`BlockError`] 返回，
//! 由上层决定如何处理。

#![no_std]

use core::any::Any;

use thiserror::Error;

/// 块设备驱动特质
///
/// `buf` 的长度总是一个完整的块。
pub trait BlockDevice: Send + Sync + Any {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), BlockError>;
    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), BlockError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("block {0} is out of range")]
    OutOfRange(usize),
    #[error("block {0} was not transferred completely")]
    Incomplete(usize),
    #[error("device failed on block {0}")]
    Device(usize),
}

impl BlockError {
    /// 出错的块ID
    #[inline]
    pub fn block_id(&self) -> usize {
        match *self {
            Self::OutOfRange(id) | Self::Incomplete(id) | Self::Device(id) => id,
        }
    }
}
