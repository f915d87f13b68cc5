use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use oufs::OpenMode;
use oufs_fuse::Env;

/// Print the contents of a file
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

    let handle = fs.open(&cli.env.cwd, &cli.path, OpenMode::Read)?;
    if !handle.exists() {
        return Err(format!("{:?} does not exist", cli.path).into());
    }

    io::stdout().lock().write_all(&handle.read_to_end(&fs)?)?;
    Ok(())
}
