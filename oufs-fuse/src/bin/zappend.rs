use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;
use oufs::OpenMode;
use oufs_fuse::Env;

/// Append standard input to a file, creating the file first if needed
#[derive(Parser)]
struct Cli {
    /// File inside the virtual disk
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
    let cwd = &cli.env.cwd;

    let mut handle = fs.open(cwd, &cli.path, OpenMode::Append)?;
    if !handle.exists() {
        fs.create_file(cwd, &cli.path)?;
        handle = fs.open(cwd, &cli.path, OpenMode::Append)?;
    }

    // 一次写完：超出文件大小上限时文件保持原样
    let mut content = Vec::new();
    io::stdin().lock().read_to_end(&mut content)?;
    let written = handle.write(&fs, &content)?;

    log::info!("appended {written} bytes to {:?}", cli.path);
    Ok(())
}
