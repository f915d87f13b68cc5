use block_dev::BlockError;
use derive_more::Display;
use thiserror::Error;

use crate::InodeId;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("no free {0} left on the disk")]
    Exhausted(Resource),
    #[error("path not found")]
    PathNotFound,
    #[error("entry already exists")]
    AlreadyExists,
    #[error("directory not empty")]
    DirectoryNotEmpty,
    #[error("directory is full")]
    DirectoryFull,
    #[error("file too large")]
    FileTooLarge,
    #[error("not a directory")]
    NotADirectory,
    #[error("is a directory")]
    IsADirectory,
    #[error("invalid file name")]
    InvalidName,
    #[error("file handle does not permit this access")]
    BadAccess,
    #[error("inode {0} is corrupted")]
    Corrupted(InodeId),
    #[error(transparent)]
    Io(#[from] BlockError),
}

/// 位图管理的两类资源
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    #[display(fmt = "inode")]
    Inode,
    #[display(fmt = "block")]
    Block,
}
