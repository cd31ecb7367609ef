use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::BonusElection;

/// Tax and take-home pay under one bonus election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub tax: Decimal,
    pub net_income: Decimal,
}

/// Side-by-side comparison of the two bonus elections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusPlan {
    pub merged: Scenario,
    pub separate: Scenario,
    pub recommendation: BonusElection,
}

impl BonusPlan {
    /// The scenario matching the recommendation.
    pub fn recommended(&self) -> &Scenario {
        match self.recommendation {
            BonusElection::Merged => &self.merged,
            BonusElection::Separate => &self.separate,
        }
    }

    /// Absolute difference in tax between the two elections.
    pub fn tax_savings(&self) -> Decimal {
        (self.merged.tax - self.separate.tax).abs()
    }
}
