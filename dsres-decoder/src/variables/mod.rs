//! Variable descriptors and value accumulation
//!
//! This module contains the resolvers that build variable descriptors from
//! the metadata matrices and the accumulator that reads the data blocks.

pub mod accumulator;
pub mod table;

// Re-export key types for convenience
pub use accumulator::Accumulator;
pub use table::{DataReference, Sign, VariableDescriptor, VariableTable};
