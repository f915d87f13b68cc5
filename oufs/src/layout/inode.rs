//! inode 的磁盘格式与内存形式
//!
//! 磁盘上的 [`DiskInode`] 只是一串定长字段，类型字节可能是任何值，
//! 读出后转换成 [`Inode`]；类型字节非法的记录会被拒绝。
//!
//! 文件的数据块全部由直接索引指向，没有间接索引块，
//! 因此文件大小的上限是 `BLOCKS_PER_INODE * BLOCK_DATA_SIZE`。
//! 目录只使用 `direct[0]`，`size` 记录目录中存活的目录项数(含 `.` 与 `..`)。

use core::mem;

use crate::block_buf::OnDisk;
use crate::{BLOCKS_PER_INODE, BlockId};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskInode {
    kind: u8,
    _reserved: u8,
    /// 硬链接个数
    links: u16,
    // 不用usize是为了严控布局
    size: u32,
    direct: [BlockId; BLOCKS_PER_INODE],
    _pad: [u8; 2],
}

unsafe impl OnDisk for DiskInode {}

#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InodeKind {
    #[default]
    None = 0,
    File = 1,
    Directory = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inode {
    pub kind: InodeKind,
    pub size: u32,
    pub links: u16,
    pub direct: [BlockId; BLOCKS_PER_INODE],
}

impl DiskInode {
    pub const SIZE: usize = mem::size_of::<Self>();
}

impl TryFrom<u8> for InodeKind {
    type Error = u8;

    fn try_from(kind: u8) -> Result<Self, u8> {
        match kind {
            0 => Ok(Self::None),
            1 => Ok(Self::File),
            2 => Ok(Self::Directory),
            other => Err(other),
        }
    }
}

impl Inode {
    pub const EMPTY: Self = Self {
        kind: InodeKind::None,
        size: 0,
        links: 0,
        direct: [BlockId::NONE; BLOCKS_PER_INODE],
    };

    /// 新目录：只有 `.` 与 `..` 两项
    #[inline]
    pub fn directory(block: BlockId) -> Self {
        let mut direct = [BlockId::NONE; BLOCKS_PER_INODE];
        direct[0] = block;
        Self {
            kind: InodeKind::Directory,
            size: 2,
            links: 1,
            direct,
        }
    }

    /// 新文件，数据块在第一次写入时才分配
    #[inline]
    pub fn file() -> Self {
        Self {
            kind: InodeKind::File,
            links: 1,
            ..Self::EMPTY
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == InodeKind::Directory
    }

    #[inline]
    pub fn is_file(&self) -> bool {
        self.kind == InodeKind::File
    }

    /// 按顺序列出已占用的数据块
    pub fn data_blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.direct
            .iter()
            .copied()
            .take_while(|block| !block.is_none())
    }
}

impl TryFrom<&DiskInode> for Inode {
    /// 非法的类型字节
    type Error = u8;

    fn try_from(raw: &DiskInode) -> Result<Self, u8> {
        Ok(Self {
            kind: InodeKind::try_from(raw.kind)?,
            size: raw.size,
            links: raw.links,
            direct: raw.direct,
        })
    }
}

impl From<&Inode> for DiskInode {
    fn from(inode: &Inode) -> Self {
        Self {
            kind: inode.kind as u8,
            _reserved: 0,
            links: inode.links,
            size: inode.size,
            direct: inode.direct,
            _pad: [0; 2],
        }
    }
}
