use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;

use dbdumper::config::Config;
use dbdumper::utils::binary_exists;

use crate::cli::{SubCommand, CLI};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = CLI::parse();

    let file = File::open(args.config.as_str())
        .with_context(|| format!("cannot open configuration file '{}'", args.config))?;
    let config: Config = serde_yaml::from_reader(file)?;

    let dumper = config.dumper()?;
    dumper.guard_against_incomplete_credentials()?;

    match &args.sub_commands {
        SubCommand::Dump(args) => {
            // a configured binary path is trusted as is
            if config.database.binary_path.is_none() {
                binary_exists(config.database.database_type.binary_name())?;
            }

            let start = std::time::Instant::now();
            let dump_file = dumper.dump_to_file(args.output.as_path())?.wait().await?;

            info!("dump done in {:?}", start.elapsed());
            println!("{}", dump_file.display());
        }
        SubCommand::Command(args) => {
            // the real credentials file only exists while a dump runs
            let credentials_file = dumper
                .credentials_file_contents()
                .map(|(suffix, _)| PathBuf::from(format!("<credentials file>{}", suffix)));

            println!(
                "{}",
                dumper.dump_command(args.output.as_path(), credentials_file.as_deref())
            );
        }
    }

    Ok(())
}
