//! # 块缓冲层
//!
//! 把一个块整块读进内存，以类型化的视图读写其中的结构，再整块写回。
//! 这里没有缓存：每一次 [`BlockBuf::load`] 和 [`BlockBuf::store`]
//! 都直接落到块设备上，写回即持久。

use core::mem;

use block_dev::BlockDevice;

use crate::{BLOCK_SIZE, BlockId, DataBlock, Result};

/// 能够原样存放在块内的结构
///
/// # Safety
///
/// 实现者必须是 `repr(C)` 或 `repr(transparent)` 的，没有隐式填充，
/// 并且任意比特模式都是它的合法值。
pub unsafe trait OnDisk: Sized {}

unsafe impl OnDisk for u8 {}
unsafe impl OnDisk for u16 {}
unsafe impl<T: OnDisk, const N: usize> OnDisk for [T; N] {}

/// 内存中的块
#[repr(C, align(8))]
pub struct BlockBuf {
    data: DataBlock,
}

impl BlockBuf {
    #[inline]
    pub const fn zeroed() -> Self {
        Self {
            data: [0; BLOCK_SIZE],
        }
    }

    pub fn load(id: BlockId, block_device: &dyn BlockDevice) -> Result<Self> {
        let mut buf = Self::zeroed();
        block_device.read_block(id.index(), &mut buf.data)?;
        Ok(buf)
    }

    pub fn store(&self, id: BlockId, block_device: &dyn BlockDevice) -> Result<()> {
        block_device.write_block(id.index(), &self.data)?;
        Ok(())
    }

    pub fn get<T: OnDisk>(&self, offset: usize) -> &T {
        Self::check::<T>(offset);
        let addr = self.offset(offset).cast::<T>();
        unsafe { &*addr }
    }

    pub fn get_mut<T: OnDisk>(&mut self, offset: usize) -> &mut T {
        Self::check::<T>(offset);
        let addr = self.offset(offset).cast_mut().cast::<T>();
        unsafe { &mut *addr }
    }

    #[inline]
    pub fn map<T: OnDisk, V>(&self, offset: usize, f: impl FnOnce(&T) -> V) -> V {
        f(self.get(offset))
    }

    #[inline]
    pub fn map_mut<T: OnDisk, V>(&mut self, offset: usize, f: impl FnOnce(&mut T) -> V) -> V {
        f(self.get_mut(offset))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl BlockBuf {
    #[inline]
    fn offset(&self, count: usize) -> *const u8 {
        &self.data[count]
    }

    /// 视图不能越过块尾，也不能落在未对齐的位置上
    #[inline]
    fn check<T>(offset: usize) {
        assert!(offset + mem::size_of::<T>() <= BLOCK_SIZE);
        assert_eq!(offset % mem::align_of::<T>(), 0);
    }
}
