use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use oufs::OuFileSystem;
use oufs_fuse::{BlockFile, Env};

/// Create (or wipe) the virtual disk and format it
#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    env: Env,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    oufs_fuse::exit(run(cli))
}

fn run(cli: Cli) -> oufs_fuse::Result<()> {
    let block_file = Arc::new(BlockFile::create(&cli.env.disk)?);
    OuFileSystem::format(block_file)?;
    log::info!("formatted {:?}", cli.env.disk);
    Ok(())
}
