use std::process::ExitCode;

use clap::Parser;
use oufs::Listing;
use oufs_fuse::Env;

/// List a directory of the virtual disk, directories marked with a trailing `/`
#[derive(Parser)]
struct Cli {
    /// Directory or file to list, the working directory if omitted
    path: Option<String>,

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
    match fs.list(&cli.env.cwd, cli.path.as_deref())? {
        Listing::Directory(entries) => entries.iter().for_each(|entry| println!("{entry}")),
        Listing::File(name) => println!("{name}"),
    }
    Ok(())
}
