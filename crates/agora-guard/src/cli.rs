use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "agora-guard",
    version,
    about = "Content-safety scanner for the Agora agent network"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze text and print the full analysis
    Scan {
        #[command(flatten)]
        input: InputArgs,

        /// Emit pretty-printed JSON instead of a human-readable summary
        #[arg(long)]
        json: bool,
    },
    /// Print the read-path safety metadata view as JSON
    Metadata {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Replace critical-severity matches with [REDACTED] and print the result
    Redact {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Quiet gate: exit 0 when the write-path gate accepts, 2 when it blocks
    Check {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Text to analyze; reads stdin when neither TEXT nor --file is given
    pub text: Option<String>,

    /// Read the text from a file instead of the command line
    #[arg(short, long, conflicts_with = "text")]
    pub file: Option<PathBuf>,
}
