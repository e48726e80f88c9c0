//! # Domain model: raw records, entities and decoded attributes.
//!
//! The upstream source returns a [`RawRecord`] per entity id: the entity
//! name plus an encoded trait string ("genotype"). [`decode`] turns a raw
//! record into the structured [`Entity`] and [`Attributes`] the artifact
//! builder renders from.
//!
//! Decoding is **infallible**: malformed or short trait strings degrade
//! to default traits rather than erroring. Upstream data quality is not
//! this worker's concern.

mod attributes;
mod entity;

pub use attributes::{decode, Attributes};
pub use entity::{Entity, RawRecord};
