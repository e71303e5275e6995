//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

/// Resolves indirect call targets in an LLVM IR module using a
/// flow-sensitive, context-sensitive points-to analysis.
#[derive(Debug, Parser)]
#[command(name = "icall-resolve", version, about)]
pub struct Args {
    /// The LLVM IR module to analyze (`.ll` text or `.bc` bitcode).
    pub module: PathBuf,

    /// Emit diagnostic logging to stderr.
    #[arg(short = 'e', long = "stderr")]
    pub stderr: bool,
}
