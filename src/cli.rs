use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "lode", about = "Large object storage companion for git")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify that the object store and pointer metadata are self-consistent
    Fsck(FsckArgs),
}

#[derive(Args, Debug)]
pub struct FsckArgs {
    /// Revision or range (`<ref>` or `<ref1>..<ref2>`) to check; defaults to
    /// the current ref plus the working index
    #[arg(value_name = "REVISION")]
    pub range: Option<String>,

    /// List corrupt objects without moving them
    #[arg(long, short = 'd')]
    pub dry_run: bool,

    /// Check object contents against their declared hashes
    #[arg(long)]
    pub objects: bool,

    /// Check pointer canonicality
    #[arg(long)]
    pub pointers: bool,
}
