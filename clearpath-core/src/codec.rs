//! Set <-> array codec for completed-step indices.
//!
//! JSON has no set type, so completion sets are stored as ascending arrays and
//! rebuilt as sets on load. Array order carries no meaning.

use std::collections::HashSet;

/// Encode a set of step indices as an ascending array.
pub fn encode_step_set(set: &HashSet<usize>) -> Vec<usize> {
    let mut out: Vec<usize> = set.iter().copied().collect();
    out.sort_unstable();
    out
}

/// Decode a stored array back into a set. Duplicates collapse.
pub fn decode_step_set(items: Vec<usize>) -> HashSet<usize> {
    items.into_iter().collect()
}

/// serde `with` adapter built on the codec pair above.
pub mod step_set {
    use std::collections::HashSet;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        set: &HashSet<usize>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        super::encode_step_set(set).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashSet<usize>, D::Error> {
        Vec::<usize>::deserialize(deserializer).map(super::decode_step_set)
    }
}
