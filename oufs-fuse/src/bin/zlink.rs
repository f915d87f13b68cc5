use std::process::ExitCode;

use clap::Parser;
use oufs::OpenMode;
use oufs_fuse::Env;

/// Create a hard link to an existing file
#[derive(Parser)]
struct Cli {
    /// Existing file
    dest: String,

    /// Name of the new link, must not exist yet
    new: String,

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

    let dest = fs.open(cwd, &cli.dest, OpenMode::Read)?;
    if !dest.exists() {
        return Err(format!("destfile {:?} does not exist", cli.dest).into());
    }
    if fs.open(cwd, &cli.new, OpenMode::Read)?.exists() {
        return Err(format!("newfile {:?} already exists", cli.new).into());
    }

    fs.link(cwd, &cli.new, dest.inode())?;
    Ok(())
}
