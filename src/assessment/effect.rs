//! Effects produced by assessment transitions

use super::StagedFile;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Upload the file; the outcome comes back tagged with `attempt`
    Upload { file: StagedFile, attempt: u64 },
}
