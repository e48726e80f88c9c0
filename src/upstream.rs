//! # Upstream entity source contract.
//!
//! [`EntitySource`] abstracts the externally-synchronized service the
//! worker reads from (in production, contract call sessions against a
//! chain node). The worker issues calls sequentially and never
//! coordinates concurrent access itself.
//!
//! All failures are transient by contract: the reconciler swallows them
//! and retries on a later sweep.

use async_trait::async_trait;

use crate::domain::RawRecord;
use crate::error::SourceError;

/// # Read access to the upstream entity collection.
///
/// Ids are sequential and dense: the tracked range is `[1, count)`,
/// where `count` may grow between calls but the worker never forgets an
/// id it has already seen.
#[async_trait]
pub trait EntitySource: Send + Sync + 'static {
    /// Returns the current total entity count.
    ///
    /// The valid id range is `[1, count)`; id 0 is reserved upstream and
    /// never tracked.
    async fn count(&self) -> Result<u64, SourceError>;

    /// Fetches the raw record for one entity.
    async fn fetch(&self, id: u64) -> Result<RawRecord, SourceError>;
}
