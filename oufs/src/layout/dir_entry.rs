use alloc::borrow::Cow;
use alloc::string::String;
use core::mem;

use crate::block_buf::OnDisk;
use crate::{FILE_NAME_SIZE, InodeId};

/// 目录项
///
/// 名字为空的目录项是空槽位，此时 inode 编号为 [`InodeId::NONE`]。
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    // 最后一字节留给 \0
    name: [u8; FILE_NAME_SIZE],
    inode: InodeId,
}

unsafe impl OnDisk for DirEntry {}

/// 名字最多保存 `FILE_NAME_SIZE - 1` 个字节，多出的部分截断
#[inline]
pub fn clip(name: &str) -> &[u8] {
    let bytes = name.as_bytes();
    &bytes[..bytes.len().min(FILE_NAME_SIZE - 1)]
}

impl DirEntry {
    /// 目录项大小恒为16字节
    pub const SIZE: usize = mem::size_of::<Self>();

    pub const EMPTY: Self = Self {
        name: [0; FILE_NAME_SIZE],
        inode: InodeId::NONE,
    };

    pub fn new(name: &str, inode: InodeId) -> Self {
        let bytes = clip(name);
        let mut name = [0; FILE_NAME_SIZE];
        name[..bytes.len()].copy_from_slice(bytes);

        Self { name, inode }
    }

    pub fn name_bytes(&self) -> &[u8] {
        let len = self
            .name
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(FILE_NAME_SIZE);
        &self.name[..len]
    }

    #[inline]
    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name_bytes())
    }

    #[inline]
    pub fn inode(&self) -> InodeId {
        self.inode
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.name[0] == 0
    }

    /// 名字按截断后的字节比较
    #[inline]
    pub fn matches(&self, name: &str) -> bool {
        !self.is_free() && self.name_bytes() == clip(name)
    }
}
