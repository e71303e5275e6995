//! Lightweight index types identifying functions and basic blocks.

/// Identifies a [`Function`](super::Function) within its owning
/// [`Module`](super::Module).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
)]
#[repr(transparent)]
#[display("fn#{_0}")]
pub struct FunctionId(u32);

impl FunctionId {
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }
}

/// Identifies a [`BasicBlock`](super::BasicBlock) within its owning
/// [`Function`](super::Function).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
)]
#[repr(transparent)]
#[display("bb#{_0}")]
pub struct BasicBlockId(u32);

impl BasicBlockId {
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }
}
