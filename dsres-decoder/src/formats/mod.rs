//! Result container formats
//!
//! Result files are MAT v4 containers. The reader turns them into the
//! matrix event stream consumed by `MatrixHandler` implementations.

pub mod mat4;

// Re-export reader type
pub use mat4::MatReader;
