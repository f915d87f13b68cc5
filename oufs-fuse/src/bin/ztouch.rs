use std::process::ExitCode;

use clap::Parser;
use oufs_fuse::Env;

/// Create an empty file if it does not exist
#[derive(Parser)]
struct Cli {
    /// Path inside the virtual disk
    path: String,

    #[command(flatten)]
    env: Env,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    oufs_fuse::exit(run(cli))
}

fn run(cli: Cli) -> oufs_fuse::Result<()> {
    let fs = cli.env.mount()?;
    let inode = fs.create_file(&cli.env.cwd, &cli.path)?;
    log::info!("{:?} is inode {inode}", cli.path);
    Ok(())
}
