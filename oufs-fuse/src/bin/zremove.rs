use std::process::ExitCode;

use clap::Parser;
use oufs_fuse::Env;

/// Remove a file, freeing it once its last link is gone
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
    fs.remove_file(&cli.env.cwd, &cli.path)?;
    Ok(())
}
