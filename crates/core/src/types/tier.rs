//! Discount tier vocabulary.

use core::fmt;

use serde::{Deserialize, Serialize};

/// One of the three discount levels a pop-up win can award.
///
/// Each tier carries a percentage-off and a probability-of-occurrence in the
/// store configuration, plus the id of the Shopify discount code backing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Mid,
    High,
}

impl Tier {
    /// All tiers, in ascending order of discount.
    pub const ALL: [Self; 3] = [Self::Low, Self::Mid, Self::High];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Mid => "Mid",
            Self::High => "High",
        }
    }

    /// Customer-facing code of the Shopify discount backing this tier.
    #[must_use]
    pub const fn discount_code(self) -> &'static str {
        match self {
            Self::Low => "POPGAMES-LOW",
            Self::Mid => "POPGAMES-MID",
            Self::High => "POPGAMES-HIGH",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
