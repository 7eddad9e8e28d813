//! Upper bounds applied by the form surface

use crate::models::Quantities;
use serde::{Deserialize, Serialize};

/// Version of the canonical rule set (bounds + message template).
/// Bump when either changes so recorded rows can be traced to a rule set.
pub const RULE_SET_VERSION: u32 = 1;

/// Per-field maximum accepted by the form. Minimum is always 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    pub bag_max: u32,
    pub small_cage_max: u32,
    pub big_cage_max: u32,
    pub pallet_max: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            bag_max: 10_000,
            small_cage_max: 1_200,
            big_cage_max: 1_200,
            pallet_max: 1_200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be between 0 and {max} (got {value})")]
pub struct LimitError {
    pub field: &'static str,
    pub max: u32,
    pub value: u32,
}

impl Limits {
    /// Fields in form order with their bound
    pub fn fields(&self) -> [(&'static str, u32); 4] {
        [
            ("BAG", self.bag_max),
            ("SMALL CAGE", self.small_cage_max),
            ("BIG CAGE", self.big_cage_max),
            ("PALLET", self.pallet_max),
        ]
    }

    pub fn check(&self, quantities: &Quantities) -> Result<(), LimitError> {
        let values = [
            quantities.bag,
            quantities.small_cage,
            quantities.big_cage,
            quantities.pallet,
        ];
        for ((field, max), value) in self.fields().into_iter().zip(values) {
            if value > max {
                return Err(LimitError { field, max, value });
            }
        }
        Ok(())
    }
}
