use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// dbdumper dumps a MySQL, PostgreSQL, MongoDB or SQLite database through its native dump tool, just pass `-h`
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct CLI {
    /// dbdumper configuration file
    #[clap(
        short,
        long,
        default_value_t = String::from("dbdumper.yaml"),
        value_name = "configuration file"
    )]
    pub config: String,
    #[clap(subcommand)]
    pub sub_commands: SubCommand,
}

/// sub commands
#[derive(Subcommand, Debug)]
pub enum SubCommand {
    /// run the dump and validate the dump file
    Dump(DumpArgs),
    /// print the shell command a dump would run
    Command(DumpArgs),
}

/// all dump arguments
#[derive(Args, Debug)]
pub struct DumpArgs {
    #[clap(short, long, parse(from_os_str), value_name = "dump file")]
    /// file the dump is written to
    pub output: PathBuf,
}
