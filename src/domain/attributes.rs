//! Trait-string decoding.
//!
//! The genotype is an opaque string of hex digits. Consecutive pairs of
//! digits select one trait each, in a fixed order: background, body,
//! eyes, mouth. Missing or non-hex pairs fall back to the first entry of
//! the table, so decoding cannot fail.

use crate::domain::entity::{Entity, RawRecord};

const BACKGROUNDS: &[&str] = &["plain", "meadow", "swamp", "night", "dusk"];
const BODIES: &[&str] = &["green", "teal", "olive", "brown"];
const EYES: &[&str] = &["round", "sleepy", "wide", "squint", "shades"];
const MOUTHS: &[&str] = &["flat", "smile", "frown", "open"];

/// Render-driving attributes decoded from an entity's trait string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attributes {
    /// Backdrop layer.
    pub background: &'static str,
    /// Base body layer.
    pub body: &'static str,
    /// Eye overlay.
    pub eyes: &'static str,
    /// Mouth overlay.
    pub mouth: &'static str,
}

/// Decodes a raw record into the entity and its render attributes.
///
/// Infallible by construction: each trait is selected by one hex pair of
/// the genotype, taken modulo its table size; absent or malformed pairs
/// select index 0.
pub fn decode(raw: &RawRecord) -> (Entity, Attributes) {
    let entity = Entity {
        name: raw.name.clone(),
    };
    let attributes = Attributes {
        background: pick(&raw.genotype, 0, BACKGROUNDS),
        body: pick(&raw.genotype, 1, BODIES),
        eyes: pick(&raw.genotype, 2, EYES),
        mouth: pick(&raw.genotype, 3, MOUTHS),
    };
    (entity, attributes)
}

/// Selects table entry `n` from the `slot`-th hex pair of the genotype.
fn pick(genotype: &str, slot: usize, table: &[&'static str]) -> &'static str {
    let code = genotype
        .get(slot * 2..slot * 2 + 2)
        .and_then(|pair| u8::from_str_radix(pair, 16).ok())
        .unwrap_or(0);
    table[usize::from(code) % table.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(genotype: &str) -> RawRecord {
        RawRecord {
            name: "specimen".into(),
            genotype: genotype.into(),
        }
    }

    #[test]
    fn test_decode_carries_name() {
        let (entity, _) = decode(&raw("00000000"));
        assert_eq!(entity.name, "specimen");
    }

    #[test]
    fn test_decode_selects_by_hex_pair() {
        let (_, attrs) = decode(&raw("01020304"));
        assert_eq!(attrs.background, BACKGROUNDS[1]);
        assert_eq!(attrs.body, BODIES[2]);
        assert_eq!(attrs.eyes, EYES[3]);
        assert_eq!(attrs.mouth, MOUTHS[0]); // 4 % 4
    }

    #[test]
    fn test_decode_short_genotype_degrades_to_defaults() {
        let (_, attrs) = decode(&raw("0a"));
        assert_eq!(attrs.background, BACKGROUNDS[10 % BACKGROUNDS.len()]);
        assert_eq!(attrs.body, BODIES[0]);
        assert_eq!(attrs.eyes, EYES[0]);
        assert_eq!(attrs.mouth, MOUTHS[0]);
    }

    #[test]
    fn test_decode_garbage_is_infallible() {
        let (_, attrs) = decode(&raw("zz!!"));
        assert_eq!(attrs.background, BACKGROUNDS[0]);
        assert_eq!(attrs.body, BODIES[0]);
    }
}
