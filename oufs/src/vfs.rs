//! # 文件系统门面
//!
//! 前端程序使用的全部操作。路径都相对于工作目录 `cwd` 解析，
//! 绝对路径则忽略 `cwd`。
//!
//! 每个操作由若干次独立的块读写组成，中途失败不会回滚；
//! 但凡能提前发现的失败(重名、目录已满)都在分配任何资源之前报告。

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use enumflags2::BitFlags;

use crate::file::{FileHandle, OpenMode};
use crate::layout::{DirBlock, Inode, InodeKind};
use crate::path::leaf_name;
use crate::{Error, InodeId, OuFileSystem, Result};

/// 列目录时的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    pub inode: InodeId,
    pub kind: InodeKind,
}

/// 列目录的结果：目标是文件时只给出它的名字
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Directory(Vec<ListEntry>),
    File(String),
}

impl OuFileSystem {
    /// 创建目录，返回新目录的 inode 编号
    pub fn make_directory(&self, cwd: &str, path: &str) -> Result<InodeId> {
        let name = new_name(path)?;
        let (parent_id, mut parent, mut dir) = self.parent_of(cwd, path)?;
        if dir.find(name).is_some() {
            return Err(Error::AlreadyExists);
        }
        if dir.free_slot().is_none() {
            return Err(Error::DirectoryFull);
        }

        let inode_id = self.alloc_inode()?;
        let block = match self.alloc_block() {
            Ok(block) => block,
            Err(err) => {
                self.free_inode(inode_id)?;
                return Err(err);
            }
        };
        // 目录块恰好占满整个块，无需另行清零
        self.write_dir(block, &DirBlock::new(inode_id, parent_id))?;
        self.write_inode(inode_id, &Inode::directory(block))?;
        self.add_entry(parent_id, &mut parent, &mut dir, name, inode_id)?;

        log::info!("mkdir {path:?}: inode {inode_id}, block {block}");
        Ok(inode_id)
    }

    /// 删除空目录
    pub fn remove_directory(&self, cwd: &str, path: &str) -> Result<()> {
        let name = new_name(path)?;
        let (parent_id, mut parent, mut dir) = self.parent_of(cwd, path)?;
        let (_, target_id) = dir.find(name).ok_or(Error::PathNotFound)?;

        let target = self.read_inode(target_id)?;
        if !target.is_dir() {
            return Err(Error::NotADirectory);
        }
        if !self.read_dir(target.direct[0])?.is_empty() {
            return Err(Error::DirectoryNotEmpty);
        }

        self.drop_entry(parent_id, &mut parent, &mut dir, name)?;
        self.dealloc_block(target.direct[0])?;
        self.dealloc_inode(target_id)?;

        log::info!("rmdir {path:?}: inode {target_id}");
        Ok(())
    }

    /// 创建空文件；同名文件已存在时什么也不做，返回它的 inode 编号
    pub fn create_file(&self, cwd: &str, path: &str) -> Result<InodeId> {
        let name = new_name(path)?;
        let (parent_id, mut parent, mut dir) = self.parent_of(cwd, path)?;
        if let Some((_, existing)) = dir.find(name) {
            return match self.read_inode(existing)?.kind {
                InodeKind::File => Ok(existing),
                _ => Err(Error::AlreadyExists),
            };
        }
        if dir.free_slot().is_none() {
            return Err(Error::DirectoryFull);
        }

        let inode_id = self.alloc_inode()?;
        self.write_inode(inode_id, &Inode::file())?;
        self.add_entry(parent_id, &mut parent, &mut dir, name, inode_id)?;

        log::info!("touch {path:?}: inode {inode_id}");
        Ok(inode_id)
    }

    /// 删除文件的一个目录项；最后一个链接消失时回收 inode 与数据块
    pub fn remove_file(&self, cwd: &str, path: &str) -> Result<()> {
        let name = new_name(path)?;
        let (parent_id, mut parent, mut dir) = self.parent_of(cwd, path)?;
        let (_, target_id) = dir.find(name).ok_or(Error::PathNotFound)?;

        let mut target = self.read_inode(target_id)?;
        if target.is_dir() {
            return Err(Error::IsADirectory);
        }

        self.drop_entry(parent_id, &mut parent, &mut dir, name)?;

        if target.links > 1 {
            target.links -= 1;
            self.write_inode(target_id, &target)?;
            log::info!("unlink {path:?}: inode {target_id} has {} links left", target.links);
        } else {
            for block in target.data_blocks() {
                self.dealloc_block(block)?;
            }
            self.dealloc_inode(target_id)?;
            log::info!("unlink {path:?}: inode {target_id} reclaimed");
        }

        Ok(())
    }

    /// 为已有文件 `target` 建立硬链接 `path`
    pub fn link(&self, cwd: &str, path: &str, target: InodeId) -> Result<()> {
        let name = new_name(path)?;
        if target.is_none() {
            return Err(Error::PathNotFound);
        }

        let mut target_inode = self.read_inode(target)?;
        match target_inode.kind {
            InodeKind::File => {}
            InodeKind::Directory => return Err(Error::IsADirectory),
            InodeKind::None => return Err(Error::PathNotFound),
        }

        let (parent_id, mut parent, mut dir) = self.parent_of(cwd, path)?;
        if dir.find(name).is_some() {
            return Err(Error::AlreadyExists);
        }
        self.add_entry(parent_id, &mut parent, &mut dir, name, target)?;

        target_inode.links += 1;
        self.write_inode(target, &target_inode)?;

        log::info!("link {path:?} -> inode {target}");
        Ok(())
    }

    /// 打开文件。文件不存在时返回的句柄指向 [`InodeId::NONE`]，
    /// 可由 [`FileHandle::exists`] 判断。
    pub fn open(
        &self,
        cwd: &str,
        path: &str,
        mode: impl Into<BitFlags<OpenMode>>,
    ) -> Result<FileHandle> {
        let mode = mode.into();
        let id = match self.locate(cwd, path, false) {
            Ok(id) => id,
            Err(Error::PathNotFound) => return Ok(FileHandle::missing(mode)),
            Err(err) => return Err(err),
        };

        let inode = self.read_inode(id)?;
        if inode.is_dir() {
            return Err(Error::IsADirectory);
        }

        if mode.contains(OpenMode::Truncate) && inode.size > 0 {
            self.truncate(id)?;
            return Ok(FileHandle::new(id, mode, 0));
        }

        Ok(FileHandle::new(id, mode, inode.size))
    }

    /// 列出 `path` (缺省为工作目录)下的目录项，按名字排序
    pub fn list(&self, cwd: &str, path: Option<&str>) -> Result<Listing> {
        let target = match path {
            Some(path) => self.locate(cwd, path, false)?,
            None => self.resolve_with_cwd("", cwd, InodeId::ROOT, "", false, false)?,
        };

        let inode = self.read_inode(target)?;
        match inode.kind {
            InodeKind::Directory => Ok(Listing::Directory(self.list_entries(&inode)?)),
            InodeKind::File => {
                let name = path.map(leaf_name).unwrap_or_default();
                Ok(Listing::File(name.to_string()))
            }
            InodeKind::None => Err(Error::Corrupted(target)),
        }
    }

    /// 目录的全部存活目录项，按名字的字节序排列；不改动磁盘上的目录块
    pub fn list_entries(&self, dir: &Inode) -> Result<Vec<ListEntry>> {
        let mut entries = self
            .read_dir(dir.direct[0])?
            .live()
            .map(|entry| -> Result<ListEntry> {
                Ok(ListEntry {
                    name: entry.name().into_owned(),
                    inode: entry.inode(),
                    kind: self.read_inode(entry.inode())?.kind,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        entries.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

impl OuFileSystem {
    /// 父目录模式解析，返回父目录的编号、inode 与目录块
    fn parent_of(&self, cwd: &str, path: &str) -> Result<(InodeId, Inode, DirBlock)> {
        let parent_id = self.locate(cwd, path, true)?;
        let parent = self.read_inode(parent_id)?;
        if !parent.is_dir() {
            return Err(Error::NotADirectory);
        }
        let dir = self.read_dir(parent.direct[0])?;

        Ok((parent_id, parent, dir))
    }

    fn add_entry(
        &self,
        parent_id: InodeId,
        parent: &mut Inode,
        dir: &mut DirBlock,
        name: &str,
        target: InodeId,
    ) -> Result<()> {
        dir.insert(name, target)?;
        self.write_dir(parent.direct[0], dir)?;

        parent.size += 1;
        self.write_inode(parent_id, parent)
    }

    fn drop_entry(
        &self,
        parent_id: InodeId,
        parent: &mut Inode,
        dir: &mut DirBlock,
        name: &str,
    ) -> Result<()> {
        dir.remove(name);
        self.write_dir(parent.direct[0], dir)?;

        parent.size = parent.size.saturating_sub(1);
        self.write_inode(parent_id, parent)
    }
}

/// 要创建或删除的最后一个分量：不能为空，不能是 `.` 或 `..`
fn new_name(path: &str) -> Result<&str> {
    match leaf_name(path) {
        "" | "." | ".." => Err(Error::InvalidName),
        name if name.contains('\0') => Err(Error::InvalidName),
        name => Ok(name),
    }
}

impl ListEntry {
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == InodeKind::Directory
    }
}

/// 目录名后面加上 `/`
impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dir() {
            write!(f, "{}/", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}
