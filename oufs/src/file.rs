//! # 文件读写层
//!
//! 写入总是追加在文件末尾。句柄记录的是**活动块内**的偏移，
//! 文件内的全局位置由 inode 的 `size` 决定：活动块的下标为
//! `size / BLOCK_DATA_SIZE`。
//!
//! 一次写入若没有越过活动块的末尾，就在活动块内写完(常规写)；
//! 否则拆成两段，前段填满活动块，后段写进新分配的块(溢出写)。
//! 活动块恰好写满时不急于分配新块，留到下一次写入。

use alloc::vec;
use alloc::vec::Vec;

use enumflags2::{BitFlags, bitflags};

use crate::block_buf::BlockBuf;
use crate::layout::{Inode, InodeKind};
use crate::{BLOCK_DATA_SIZE, BLOCKS_PER_INODE, BlockId, MAX_FILE_SIZE};
use crate::{Error, InodeId, OuFileSystem, Result};

#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read = 1 << 0,
    Write = 1 << 1,
    Append = 1 << 2,
    /// 打开时清空已有内容
    Truncate = 1 << 3,
}

/// 打开的文件，不会写到磁盘上
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHandle {
    inode: InodeId,
    mode: BitFlags<OpenMode>,
    /// 活动块内的偏移，取值 `0..=BLOCK_DATA_SIZE`
    offset: usize,
}

impl OpenMode {
    /// 解析 `r`、`w`、`a` 风格的模式串
    pub fn parse(mode: &str) -> Option<BitFlags<Self>> {
        let flags: BitFlags<Self> = match mode {
            "r" => Self::Read.into(),
            "w" => Self::Write | Self::Truncate,
            "a" => Self::Append.into(),
            "r+" => Self::Read | Self::Write,
            "w+" => Self::Read | Self::Write | Self::Truncate,
            "a+" => Self::Read | Self::Append,
            _ => return None,
        };
        Some(flags)
    }
}

impl FileHandle {
    #[inline]
    pub(crate) fn new(inode: InodeId, mode: BitFlags<OpenMode>, size: u32) -> Self {
        Self {
            inode,
            mode,
            offset: Self::block_offset(size),
        }
    }

    /// 指向不存在文件的句柄
    #[inline]
    pub(crate) fn missing(mode: BitFlags<OpenMode>) -> Self {
        Self {
            inode: InodeId::NONE,
            mode,
            offset: 0,
        }
    }

    #[inline]
    pub fn inode(&self) -> InodeId {
        self.inode
    }

    #[inline]
    pub fn exists(&self) -> bool {
        !self.inode.is_none()
    }

    #[inline]
    pub fn mode(&self) -> BitFlags<OpenMode> {
        self.mode
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 把 `buf` 追加到文件末尾，返回写入的字节数。
    ///
    /// 写入后文件若超过 [`MAX_FILE_SIZE`]，则什么也不写，
    /// 返回 [`Error::FileTooLarge`]。
    ///
    /// 中途块用尽时返回 [`Error::Exhausted`]，此前写完的块不会撤销；
    /// 已追加的字节数可由 inode 的 `size` 得知。
    pub fn write(&mut self, fs: &OuFileSystem, buf: &[u8]) -> Result<usize> {
        if !self.mode.intersects(OpenMode::Write | OpenMode::Append) {
            return Err(Error::BadAccess);
        }
        let mut inode = self.file_inode(fs)?;

        if buf.is_empty() {
            return Ok(0);
        }
        if inode.size as usize + buf.len() > MAX_FILE_SIZE {
            log::warn!(
                "inode {}: appending {} bytes to {} exceeds {MAX_FILE_SIZE}",
                self.inode,
                buf.len(),
                inode.size
            );
            return Err(Error::FileTooLarge);
        }

        // 句柄可能落后于其它句柄的写入，以 size 为准
        self.offset = Self::block_offset(inode.size);

        if inode.direct[0].is_none() {
            inode.direct[0] = fs.alloc_zeroed_block()?;
            fs.write_inode(self.inode, &inode)?;
            self.offset = 0;
        }

        let mut written = 0;
        while written < buf.len() {
            match self.append_chunk(fs, &mut inode, &buf[written..]) {
                Ok(len) => written += len,
                Err(err) => {
                    log::warn!(
                        "inode {}: write stopped after {written} of {} bytes: {err}",
                        self.inode,
                        buf.len()
                    );
                    return Err(err);
                }
            }
        }

        log::debug!("inode {}: size {} after write", self.inode, inode.size);
        Ok(written)
    }

    /// 读出文件的全部内容
    pub fn read_to_end(&self, fs: &OuFileSystem) -> Result<Vec<u8>> {
        if !self.mode.contains(OpenMode::Read) {
            return Err(Error::BadAccess);
        }
        self.file_inode(fs)?;
        fs.read_to_end(self.inode)
    }
}

impl FileHandle {
    /// 由文件大小推出活动块内的偏移：写满的块视作偏移为块大小
    #[inline]
    fn block_offset(size: u32) -> usize {
        match size as usize {
            0 => 0,
            size if size % BLOCK_DATA_SIZE == 0 => BLOCK_DATA_SIZE,
            size => size % BLOCK_DATA_SIZE,
        }
    }

    #[inline]
    fn active_index(inode: &Inode) -> usize {
        let index = inode.size as usize / BLOCK_DATA_SIZE;
        debug_assert!(index < BLOCKS_PER_INODE);
        index
    }

    fn file_inode(&self, fs: &OuFileSystem) -> Result<Inode> {
        if !self.exists() {
            return Err(Error::PathNotFound);
        }

        let inode = fs.read_inode(self.inode)?;
        match inode.kind {
            InodeKind::File => Ok(inode),
            InodeKind::Directory => Err(Error::IsADirectory),
            InodeKind::None => Err(Error::PathNotFound),
        }
    }

    /// 写入一段，活动块已满时先分配下一块
    fn append_chunk(&mut self, fs: &OuFileSystem, inode: &mut Inode, rest: &[u8]) -> Result<usize> {
        if self.offset == BLOCK_DATA_SIZE {
            let index = Self::active_index(inode);
            inode.direct[index] = fs.alloc_zeroed_block()?;
            fs.write_inode(self.inode, inode)?;
            self.offset = 0;
        }

        if rest.len() <= BLOCK_DATA_SIZE - self.offset {
            self.regular_write(fs, inode, rest)
        } else {
            self.bleed_write(fs, inode, rest)
        }
    }

    /// 数据完全落在活动块内
    fn regular_write(&mut self, fs: &OuFileSystem, inode: &mut Inode, buf: &[u8]) -> Result<usize> {
        let block = inode.direct[Self::active_index(inode)];

        let mut data = fs.read_block(block)?;
        data.as_bytes_mut()[self.offset..self.offset + buf.len()].copy_from_slice(buf);
        fs.write_block(block, &data)?;

        self.offset += buf.len();
        inode.size += buf.len() as u32;
        fs.write_inode(self.inode, inode)?;
        Ok(buf.len())
    }

    /// 数据越过活动块的末尾：前段填满活动块，后段(至多一块)写进新块
    fn bleed_write(&mut self, fs: &OuFileSystem, inode: &mut Inode, buf: &[u8]) -> Result<usize> {
        let index = Self::active_index(inode);
        let (prefix, suffix) = buf.split_at(BLOCK_DATA_SIZE - self.offset);
        let suffix = &suffix[..suffix.len().min(BLOCK_DATA_SIZE)];

        // 先分配，分配失败时文件保持原样
        let next = fs.alloc_block()?;

        let block = inode.direct[index];
        let mut data = fs.read_block(block)?;
        data.as_bytes_mut()[self.offset..].copy_from_slice(prefix);
        fs.write_block(block, &data)?;

        // 新块整块写入，后段之外的部分为 0
        let mut data = BlockBuf::zeroed();
        data.as_bytes_mut()[..suffix.len()].copy_from_slice(suffix);
        fs.write_block(next, &data)?;

        inode.direct[index + 1] = next;
        inode.size += (prefix.len() + suffix.len()) as u32;
        fs.write_inode(self.inode, inode)?;

        self.offset = suffix.len();
        Ok(prefix.len() + suffix.len())
    }
}

impl OuFileSystem {
    /// 从指定位置(字节偏移)读出数据填充`buf`，不会读过文件末尾
    pub fn read_at(&self, id: InodeId, offset: usize, buf: &mut [u8]) -> Result<usize> {
        let inode = self.read_inode(id)?;
        if inode.is_dir() {
            return Err(Error::IsADirectory);
        }

        let size = inode.size as usize;
        if offset >= size {
            return Ok(0);
        }

        let end = offset.saturating_add(buf.len()).min(size);
        let mut start = offset;
        let mut read_size = 0;

        while start < end {
            let block_index = start / BLOCK_DATA_SIZE;
            // 当前块的末地址(字节)
            let block_end = ((block_index + 1) * BLOCK_DATA_SIZE).min(end);
            let len = block_end - start;
            let inner = start % BLOCK_DATA_SIZE;

            let data = self.read_block(inode.direct[block_index])?;
            buf[read_size..read_size + len].copy_from_slice(&data.as_bytes()[inner..inner + len]);

            read_size += len;
            start = block_end;
        }

        Ok(read_size)
    }

    pub fn read_to_end(&self, id: InodeId) -> Result<Vec<u8>> {
        let size = self.read_inode(id)?.size as usize;
        let mut buf = vec![0; size];
        let len = self.read_at(id, 0, &mut buf)?;
        buf.truncate(len);
        Ok(buf)
    }

    /// 释放文件的全部数据块，大小归零
    pub fn truncate(&self, id: InodeId) -> Result<()> {
        let mut inode = self.read_inode(id)?;
        match inode.kind {
            InodeKind::File => {}
            InodeKind::Directory => return Err(Error::IsADirectory),
            InodeKind::None => return Err(Error::PathNotFound),
        }

        for block in inode.data_blocks() {
            self.dealloc_block(block)?;
        }
        inode.direct = [BlockId::NONE; BLOCKS_PER_INODE];
        inode.size = 0;
        self.write_inode(id, &inode)
    }
}
