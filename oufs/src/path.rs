//! # 路径解析层
//!
//! 路径以 `/` 分隔，空分量(例如连续的 `/`)被忽略，
//! `.` 与 `..` 就是目录里的普通目录项。
//!
//! 解析从某个目录 inode 出发，逐个分量地查找目录项。
//! 父目录模式下，最后一个分量不再解析，调用者拿到它所在目录的 inode，
//! 创建类的操作都依赖这种模式。

use crate::layout::{Inode, clip};
use crate::{Error, InodeId, OuFileSystem, Result};

/// 路径中非空的分量
#[inline]
pub fn tokens(path: &str) -> impl DoubleEndedIterator<Item = &str> {
    path.split('/').filter(|token| !token.is_empty())
}

/// 路径的最后一个分量；根路径返回空串
#[inline]
pub fn leaf_name(path: &str) -> &str {
    tokens(path).next_back().unwrap_or("")
}

#[inline]
fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

impl OuFileSystem {
    /// 从 `base` 出发解析 `path`。
    ///
    /// 途经的分量必须是目录，最后一个分量可以是文件。
    /// `stop_before_leaf` 为真且最后一个分量就是 `leaf_name` 时，
    /// 返回最后一个分量所在目录的 inode。
    pub fn resolve_from(
        &self,
        path: &str,
        base: InodeId,
        leaf_name: &str,
        stop_before_leaf: bool,
    ) -> Result<InodeId> {
        let mut tokens = tokens(path).peekable();
        let mut current = base;

        while let Some(token) = tokens.next() {
            let inode = self.read_inode(current)?;
            if !inode.is_dir() {
                log::debug!("{path:?}: {token:?} lies under non-directory inode {current}");
                return Err(Error::PathNotFound);
            }

            if stop_before_leaf && tokens.peek().is_none() && clip(token) == clip(leaf_name) {
                break;
            }

            current = self.lookup(&inode, token).inspect_err(|_| {
                log::debug!("{path:?}: {token:?} not found in inode {current}");
            })?;
        }

        Ok(current)
    }

    /// 先从 `base` 出发走完 `cwd`，再视 `continue_into_path`
    /// 从到达的目录继续解析 `path`。
    ///
    /// 工作目录被认为已经存在，走不通就是 [`Error::PathNotFound`]。
    pub fn resolve_with_cwd(
        &self,
        path: &str,
        cwd: &str,
        base: InodeId,
        leaf_name: &str,
        continue_into_path: bool,
        stop_before_leaf: bool,
    ) -> Result<InodeId> {
        let mut current = base;
        for token in tokens(cwd) {
            let inode = self.read_inode(current)?;
            if !inode.is_dir() {
                log::debug!("cwd {cwd:?}: {token:?} lies under a file");
                return Err(Error::PathNotFound);
            }
            current = self.lookup(&inode, token).inspect_err(|_| {
                log::debug!("cwd {cwd:?}: {token:?} does not exist");
            })?;
        }

        if !self.read_inode(current)?.is_dir() {
            log::debug!("cwd {cwd:?} is not a directory");
            return Err(Error::PathNotFound);
        }

        if continue_into_path {
            self.resolve_from(path, current, leaf_name, stop_before_leaf)
        } else {
            Ok(current)
        }
    }

    /// 解析前端给出的路径：绝对路径从根目录出发，忽略工作目录；
    /// 相对路径从工作目录出发。
    pub fn locate(&self, cwd: &str, path: &str, stop_before_leaf: bool) -> Result<InodeId> {
        let leaf = leaf_name(path);
        if is_absolute(path) {
            self.resolve_from(path, InodeId::ROOT, leaf, stop_before_leaf)
        } else {
            self.resolve_with_cwd(path, cwd, InodeId::ROOT, leaf, true, stop_before_leaf)
        }
    }

    /// 在目录下通过名字获取 inode 编号
    fn lookup(&self, dir: &Inode, name: &str) -> Result<InodeId> {
        self.read_dir(dir.direct[0])?
            .find(name)
            .map(|(_, inode)| inode)
            .ok_or(Error::PathNotFound)
    }
}
