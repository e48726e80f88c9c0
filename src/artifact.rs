//! # Artifact builder contract.
//!
//! [`ArtifactBuilder`] abstracts rendering and persisting the derived
//! artifact for one entity (in production, image composition plus a
//! storage upload). The worker always requests overwrite so a backfill
//! replaces the previous artifact.
//!
//! On failure the builder owes no partial-artifact cleanup guarantee to
//! the worker; the entity simply stays pending and is retried on every
//! future sweep.

use async_trait::async_trait;

use crate::domain::{Attributes, Entity};
use crate::error::BuildError;

/// # Renders and persists the derived artifact for one entity.
#[async_trait]
pub trait ArtifactBuilder: Send + Sync + 'static {
    /// Builds the artifact for `id` from the decoded entity and
    /// attributes, replacing any existing artifact when `overwrite` is
    /// set.
    async fn create(
        &self,
        id: u64,
        entity: &Entity,
        attributes: &Attributes,
        overwrite: bool,
    ) -> Result<(), BuildError>;
}
