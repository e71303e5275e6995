//! Error types shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to lower an input file into an [`crate::ir::Module`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input file could not be read from disk.
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `inkwell`/LLVM rejected the file as neither valid LLVM IR text
    /// nor valid bitcode.
    #[error("{path} is not valid LLVM IR: {message}")]
    Parse { path: PathBuf, message: String },

    /// The module parsed, but contains a construct the frontend has no
    /// lowering for and cannot soundly skip (e.g. a call whose callee
    /// operand is not a value the IR model can represent).
    #[error("unsupported construct in {path}: {message}")]
    Unsupported { path: PathBuf, message: String },
}
