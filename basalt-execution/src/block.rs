//! Installed block: a signature plus the batch holding its rows.

use basalt_memory::Batch;
use basalt_meta::BlockSignature;

/// An immutable, capacity-bounded batch of rows paired with its identity.
///
/// A block owns its batch outright; once emitted by the ingest pipeline the
/// pair never changes, only whole blocks are replaced.
pub struct BatchBlock {
    signature: BlockSignature,
    data: Batch,
}

impl BatchBlock {
    pub fn new(signature: BlockSignature, data: Batch) -> Self {
        Self { signature, data }
    }

    pub fn signature(&self) -> &BlockSignature {
        &self.signature
    }

    pub fn data(&self) -> &Batch {
        &self.data
    }

    pub fn rows(&self) -> usize {
        self.data.rows()
    }

    pub fn memory(&self) -> usize {
        self.data.memory()
    }
}
