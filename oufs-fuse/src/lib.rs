
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use block_dev::{BlockDevice, BlockError};
use clap::Args;
use oufs::{BLOCK_SIZE, N_BLOCKS_IN_DISK, OuFileSystem};

pub type Result<T, E = Box<dyn std::error::Error>> = std::result::Result<T, E>;

/// 以宿主机上的普通文件作为虚拟磁盘
#[derive(Debug)]
pub struct BlockFile(pub Mutex<File>);

/// Settings shared by every front end
#[derive(Debug, Clone, Args)]
pub struct Env {
    /// Working directory inside the virtual disk
    #[arg(long, env = "ZPWD", default_value = "/")]
    pub cwd: String,

    /// Host file holding the virtual disk
    #[arg(long, env = "ZDISK", default_value = "vdisk1")]
    pub disk: PathBuf,
}

impl BlockFile {
    pub const DISK_SIZE: u64 = (N_BLOCKS_IN_DISK * BLOCK_SIZE) as u64;

    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let fd = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self(Mutex::new(fd)))
    }

    /// 创建磁盘镜像，已存在则清空重建
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let fd = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        fd.set_len(Self::DISK_SIZE)?;
        Ok(Self(Mutex::new(fd)))
    }

    fn seek(&self, block_id: usize) -> Result<std::sync::MutexGuard<'_, File>, BlockError> {
        if block_id >= N_BLOCKS_IN_DISK {
            return Err(BlockError::OutOfRange(block_id));
        }

        let mut file = self.0.lock().map_err(|_| BlockError::Device(block_id))?;
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))
            .map_err(|err| io_error(block_id, err))?;
        Ok(file)
    }
}

impl BlockDevice for BlockFile {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), BlockError> {
        self.seek(block_id)?
            .read_exact(buf)
            .map_err(|err| io_error(block_id, err))
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), BlockError> {
        self.seek(block_id)?
            .write_all(buf)
            .map_err(|err| io_error(block_id, err))
    }
}

fn io_error(block_id: usize, err: io::Error) -> BlockError {
    log::error!("block {block_id}: {err}");
    match err.kind() {
        io::ErrorKind::UnexpectedEof | io::ErrorKind::WriteZero => BlockError::Incomplete(block_id),
        _ => BlockError::Device(block_id),
    }
}

impl Env {
    /// 打开已格式化的虚拟磁盘
    pub fn mount(&self) -> Result<OuFileSystem> {
        log::info!("disk={:?} cwd={:?}", self.disk, self.cwd);
        let block_file: Arc<dyn BlockDevice> = Arc::new(BlockFile::open(&self.disk)?);
        Ok(OuFileSystem::open(block_file)?)
    }
}

/// 把前端的执行结果翻译成退出码
pub fn exit(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err}");
            ExitCode::FAILURE
        }
    }
}
