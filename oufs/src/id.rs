//! 块与 inode 的编号
//!
//! 两者在磁盘上都是 `u16`，全 1 表示“未分配”。

use derive_more::{Display, From, Into};

use crate::block_buf::OnDisk;

/// 块编号
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
#[repr(transparent)]
pub struct BlockId(u16);

/// inode 编号
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
#[repr(transparent)]
pub struct InodeId(u16);

impl BlockId {
    pub const NONE: Self = Self(u16::MAX);

    #[inline]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl InodeId {
    pub const NONE: Self = Self(u16::MAX);
    pub const ROOT: Self = Self(0);

    #[inline]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

unsafe impl OnDisk for BlockId {}
unsafe impl OnDisk for InodeId {}
