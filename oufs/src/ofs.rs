//! # 磁盘块管理器层
//!
//! 构建出磁盘的布局并使用：主块上的两张位图负责分配 inode 与块，
//! inode 表负责把 inode 编号映射到磁盘上的位置。
//!
//! 每一次修改都立即写回块设备；多个步骤组成的操作没有原子性。
//!
//! 引擎假定独占磁盘镜像：同一镜像同时被多个进程打开，
//! 或同一个 [`OuFileSystem`] 被多个线程并发调用，其行为是未定义的，
//! 位图与目录块都可能被写坏。

use alloc::sync::Arc;

use block_dev::BlockDevice;

use crate::block_buf::BlockBuf;
use crate::layout::*;
use crate::{BlockId, Error, InodeId, Resource, Result};
use crate::{
    INODE_AREA_START, INODES_PER_BLOCK, MASTER_BLOCK, N_BLOCKS_IN_DISK, N_INODES,
    ROOT_DIRECTORY_BLOCK,
};

/// 一块已格式化的磁盘，同一时刻只能有一个使用者
pub struct OuFileSystem {
    block_device: Arc<dyn BlockDevice>,
}

impl OuFileSystem {
    /// 格式化磁盘：清零所有块，占用主块、inode 表与根目录块，
    /// 并在 0 号 inode 上建立根目录。
    pub fn format(block_device: Arc<dyn BlockDevice>) -> Result<Self> {
        let fs = Self { block_device };

        let zero = BlockBuf::zeroed();
        for id in 0..N_BLOCKS_IN_DISK {
            zero.store(BlockId::new(id as u16), fs.device())?;
        }

        let mut master = BlockBuf::zeroed();
        master.map_mut(0, |master: &mut MasterBlock| {
            master.bitmap(Resource::Inode).set(InodeId::ROOT.index());
            let mut blocks = master.bitmap(Resource::Block);
            for id in MASTER_BLOCK.index()..=ROOT_DIRECTORY_BLOCK.index() {
                blocks.set(id);
            }
        });
        master.store(MASTER_BLOCK, fs.device())?;

        fs.write_inode(InodeId::ROOT, &Inode::directory(ROOT_DIRECTORY_BLOCK))?;
        fs.write_dir(
            ROOT_DIRECTORY_BLOCK,
            &DirBlock::new(InodeId::ROOT, InodeId::ROOT),
        )?;

        log::info!("formatted: {N_BLOCKS_IN_DISK} blocks, {N_INODES} inodes");
        Ok(fs)
    }

    /// 打开已格式化的磁盘
    pub fn open(block_device: Arc<dyn BlockDevice>) -> Result<Self> {
        let fs = Self { block_device };

        let root = fs.read_inode(InodeId::ROOT)?;
        if !root.is_dir() || !fs.is_inode_allocated(InodeId::ROOT)? {
            log::error!("root inode is not a directory, is the disk formatted?");
            return Err(Error::Corrupted(InodeId::ROOT));
        }

        Ok(fs)
    }

    #[inline]
    pub fn block_device(&self) -> &Arc<dyn BlockDevice> {
        &self.block_device
    }

    /// 在磁盘上分配新的 inode 并返回其编号
    #[inline]
    pub fn alloc_inode(&self) -> Result<InodeId> {
        self.alloc(Resource::Inode).map(|id| InodeId::new(id as u16))
    }

    /// 在磁盘上分配新的块并返回其编号，块的内容保持原样
    #[inline]
    pub fn alloc_block(&self) -> Result<BlockId> {
        self.alloc(Resource::Block).map(|id| BlockId::new(id as u16))
    }

    /// 分配新块并清零
    pub fn alloc_zeroed_block(&self) -> Result<BlockId> {
        let block = self.alloc_block()?;
        self.zero_block(block)?;
        Ok(block)
    }

    #[inline]
    pub fn free_inode(&self, id: InodeId) -> Result<()> {
        self.free(Resource::Inode, id.index())
    }

    #[inline]
    pub fn free_block(&self, id: BlockId) -> Result<()> {
        self.free(Resource::Block, id.index())
    }

    /// 清空 inode 记录并释放
    pub fn dealloc_inode(&self, id: InodeId) -> Result<()> {
        self.write_inode(id, &Inode::EMPTY)?;
        self.free_inode(id)
    }

    /// 清零块并释放
    pub fn dealloc_block(&self, id: BlockId) -> Result<()> {
        self.zero_block(id)?;
        self.free_block(id)
    }

    #[inline]
    pub fn zero_block(&self, id: BlockId) -> Result<()> {
        BlockBuf::zeroed().store(id, self.device())
    }

    pub fn is_inode_allocated(&self, id: InodeId) -> Result<bool> {
        self.with_master(|master| master.is_allocated(Resource::Inode, id.index()))
    }

    pub fn is_block_allocated(&self, id: BlockId) -> Result<bool> {
        self.with_master(|master| master.is_allocated(Resource::Block, id.index()))
    }

    /// 通过编号获取 inode 在磁盘上的位置：**块编号**以及**块内偏移**
    pub fn disk_inode_pos(id: InodeId) -> (BlockId, usize) {
        let block = INODE_AREA_START.index() + id.index() / INODES_PER_BLOCK;
        let offset = id.index() % INODES_PER_BLOCK * DiskInode::SIZE;

        (BlockId::new(block as u16), offset)
    }

    pub fn read_inode(&self, id: InodeId) -> Result<Inode> {
        if id.index() >= N_INODES {
            return Err(Error::Corrupted(id));
        }

        let (block, offset) = Self::disk_inode_pos(id);
        BlockBuf::load(block, self.device())?
            .map(offset, |raw: &DiskInode| Inode::try_from(raw))
            .map_err(|kind| {
                log::error!("inode {id} has an invalid kind {kind}");
                Error::Corrupted(id)
            })
    }

    pub fn write_inode(&self, id: InodeId, inode: &Inode) -> Result<()> {
        if id.index() >= N_INODES {
            return Err(Error::Corrupted(id));
        }

        let (block, offset) = Self::disk_inode_pos(id);
        let mut buf = BlockBuf::load(block, self.device())?;
        buf.map_mut(offset, |raw: &mut DiskInode| *raw = DiskInode::from(inode));
        buf.store(block, self.device())
    }

    pub fn read_dir(&self, block: BlockId) -> Result<DirBlock> {
        Ok(*BlockBuf::load(block, self.device())?.get::<DirBlock>(0))
    }

    pub fn write_dir(&self, block: BlockId, dir: &DirBlock) -> Result<()> {
        let mut buf = BlockBuf::zeroed();
        *buf.get_mut::<DirBlock>(0) = *dir;
        buf.store(block, self.device())
    }
}

impl OuFileSystem {
    #[inline]
    pub(crate) fn device(&self) -> &dyn BlockDevice {
        &*self.block_device
    }

    #[inline]
    pub(crate) fn read_block(&self, id: BlockId) -> Result<BlockBuf> {
        BlockBuf::load(id, self.device())
    }

    #[inline]
    pub(crate) fn write_block(&self, id: BlockId, buf: &BlockBuf) -> Result<()> {
        buf.store(id, self.device())
    }

    fn with_master<V>(&self, f: impl FnOnce(&MasterBlock) -> V) -> Result<V> {
        Ok(BlockBuf::load(MASTER_BLOCK, self.device())?.map(0, f))
    }

    fn alloc(&self, resource: Resource) -> Result<usize> {
        let mut master = BlockBuf::load(MASTER_BLOCK, self.device())?;
        let Some(index) =
            master.map_mut(0, |master: &mut MasterBlock| master.bitmap(resource).alloc())
        else {
            log::warn!("no free {resource} left");
            return Err(Error::Exhausted(resource));
        };
        master.store(MASTER_BLOCK, self.device())?;

        log::debug!("allocated {resource} {index}");
        Ok(index)
    }

    fn free(&self, resource: Resource, index: usize) -> Result<()> {
        let mut master = BlockBuf::load(MASTER_BLOCK, self.device())?;
        if !master.map_mut(0, |master: &mut MasterBlock| {
            master.bitmap(resource).dealloc(index)
        }) {
            log::warn!("{resource} {index} was not allocated");
            return Ok(());
        }
        master.store(MASTER_BLOCK, self.device())?;

        log::debug!("freed {resource} {index}");
        Ok(())
    }
}
