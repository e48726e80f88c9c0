//! Raw upstream records and the decoded entity.

/// Unparsed entity data as returned by the upstream source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRecord {
    /// Display name of the entity.
    pub name: String,
    /// Encoded trait string; decoded by [`decode`](crate::domain::decode).
    pub genotype: String,
}

/// Structured entity decoded from a [`RawRecord`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    /// Display name, carried through to the rendered artifact.
    pub name: String,
}
