//! # 磁盘数据结构层
//!
//! oufs 的磁盘布局：
//! 主块(两张位图) | inode 表 | 根目录块 | 数据块区域

mod master;
pub use master::{Bitmap, MasterBlock};

mod inode;
pub use inode::{DiskInode, Inode, InodeKind};

mod dir_entry;
pub use dir_entry::{DirEntry, clip};

/// 目录块，也属于磁盘文件系统数据结构
mod directory;
pub use directory::DirBlock;
