//! Lowers a real LLVM module into this crate's own [`crate::ir`].
//!
//! The analysis core never parses bytes itself; this module is a thin,
//! swappable adapter around `inkwell`'s bindings to the LLVM C API.
//! Swapping in a different source language only requires a new module
//! here — nothing in [`crate::analysis`] or [`crate::driver`] depends
//! on LLVM types.

mod llvm;

pub use llvm::load_module;
