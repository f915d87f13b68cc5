//! 目录块
//!
//! 每个目录恰好占用一个块，块内是定长的目录项数组；
//! 槽位 0 总是 `.`，槽位 1 总是 `..`。
//! 删除会在数组中留下空洞，因此查找与插入都扫描全部槽位，
//! 空槽位只是空洞，不是结束标记。

use crate::block_buf::OnDisk;
use crate::{DIRECTORY_ENTRIES_PER_BLOCK, Error, InodeId, Result};

use super::DirEntry;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirBlock {
    entries: [DirEntry; DIRECTORY_ENTRIES_PER_BLOCK],
}

unsafe impl OnDisk for DirBlock {}

impl DirBlock {
    pub const SELF_SLOT: usize = 0;
    pub const PARENT_SLOT: usize = 1;

    pub fn new(this: InodeId, parent: InodeId) -> Self {
        let mut entries = [DirEntry::EMPTY; DIRECTORY_ENTRIES_PER_BLOCK];
        entries[Self::SELF_SLOT] = DirEntry::new(".", this);
        entries[Self::PARENT_SLOT] = DirEntry::new("..", parent);

        Self { entries }
    }

    #[inline]
    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    /// 通过名字获取槽位与 inode 编号
    pub fn find(&self, name: &str) -> Option<(usize, InodeId)> {
        self.entries
            .iter()
            .enumerate()
            .find_map(|(slot, entry)| entry.matches(name).then_some((slot, entry.inode())))
    }

    #[inline]
    pub fn free_slot(&self) -> Option<usize> {
        self.entries.iter().position(DirEntry::is_free)
    }

    /// 把目录项放进第一个空槽位
    pub fn insert(&mut self, name: &str, inode: InodeId) -> Result<usize> {
        let slot = self.free_slot().ok_or(Error::DirectoryFull)?;
        self.entries[slot] = DirEntry::new(name, inode);
        Ok(slot)
    }

    /// 通过名字删除目录项并返回其 inode 编号
    pub fn remove(&mut self, name: &str) -> Option<InodeId> {
        let (slot, inode) = self.find(name)?;
        self.entries[slot] = DirEntry::EMPTY;
        Some(inode)
    }

    pub fn live(&self) -> impl Iterator<Item = &DirEntry> {
        self.entries.iter().filter(|entry| !entry.is_free())
    }

    /// 除了 `.` 与 `..` 之外没有别的目录项
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries[Self::PARENT_SLOT + 1..]
            .iter()
            .all(DirEntry::is_free)
    }
}
