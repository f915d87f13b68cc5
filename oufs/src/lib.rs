#![no_std]

extern crate alloc;

/* oufs 的整体架构，自上而下 */

// 文件系统门面：创建、删除、链接、打开、列目录
mod vfs;

// 文件读写层：按块追加写入、按字节读出
mod file;

// 路径解析层
mod path;

// 磁盘块管理器层：位图分配与 inode 表
mod ofs;

// 磁盘数据结构层：表示磁盘文件系统的数据结构
mod layout;

// 块缓冲层：一个块在内存中的副本，读写直通块设备
mod block_buf;

mod error;
mod id;

pub use block_dev::{BlockDevice, BlockError};
pub use enumflags2::BitFlags;

pub use self::{
    error::{Error, Resource, Result},
    file::{FileHandle, OpenMode},
    id::{BlockId, InodeId},
    layout::{Bitmap, DirBlock, DirEntry, DiskInode, Inode, InodeKind, MasterBlock},
    ofs::OuFileSystem,
    path::{leaf_name, tokens},
    vfs::{ListEntry, Listing},
};

pub const BLOCK_SIZE: usize = 256;
/// 数据块中存放文件内容的字节数
pub const BLOCK_DATA_SIZE: usize = BLOCK_SIZE;
pub const N_BLOCKS_IN_DISK: usize = 128;

/// inode 表占用的块数
pub const N_INODE_BLOCKS: usize = 8;
pub const INODES_PER_BLOCK: usize = BLOCK_SIZE / DiskInode::SIZE;
pub const N_INODES: usize = N_INODE_BLOCKS * INODES_PER_BLOCK;

/// 每个 inode 的直接索引块个数，没有间接索引
pub const BLOCKS_PER_INODE: usize = 15;
pub const MAX_FILE_SIZE: usize = BLOCKS_PER_INODE * BLOCK_DATA_SIZE;

/// 目录项名字的字节数，含结尾的 \0
pub const FILE_NAME_SIZE: usize = 14;
pub const DIRECTORY_ENTRIES_PER_BLOCK: usize = BLOCK_SIZE / DirEntry::SIZE;

pub const MASTER_BLOCK: BlockId = BlockId::new(0);
pub const INODE_AREA_START: BlockId = BlockId::new(1);
pub const ROOT_DIRECTORY_BLOCK: BlockId = BlockId::new(1 + N_INODE_BLOCKS as u16);

type DataBlock = [u8; BLOCK_SIZE];
