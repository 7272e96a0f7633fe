use clap::Parser;
use std::process::ExitCode;

use lode::cli::{Cli, Command};
use lode::fsck::FsckCommand;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Fsck(args) => {
            let command = FsckCommand::new(".")
                .dry_run(args.dry_run)
                .passes(args.objects, args.pointers);
            match command.run(args.range.as_deref()) {
                Ok(summary) if summary.is_clean() => ExitCode::SUCCESS,
                Ok(_) => ExitCode::from(1),
                Err(err) => {
                    eprintln!("fatal: {:#}", err);
                    ExitCode::from(2)
                }
            }
        }
    }
}
