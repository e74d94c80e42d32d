//! In-memory row containers backing Basalt data blocks.
//!
//! [`FlatBuffer`] is the schema-aware, append-with-rollback row store;
//! [`Batch`] fronts one buffer with capacity accounting and is the unit that
//! ends up inside an installed block.

pub mod batch;
pub mod flat_buffer;

pub use batch::Batch;
pub use flat_buffer::{FlatBuffer, FlatRow};
