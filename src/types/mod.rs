//! Core types for the mnemonic kernel.

pub mod symbol;
pub mod edge;
pub mod conflict;

pub use symbol::{SymbolHandle, SymbolTable, SourceId, TargetId};
pub use edge::Edge;
pub use conflict::Conflict;
