//! Range tier selection

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::fish::{RangeCosts, RangeTier};

/// How the scheduler picks a tier among the affordable ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierPolicy {
    /// Uniformly random, varying how much energy each cast spends
    #[default]
    Random,
    /// Most expensive affordable tier
    Maximum,
    /// The configured range, or the most expensive affordable one below it
    Fixed,
}

/// Pick a tier for a balance of `energy`; `None` when nothing is affordable
pub fn select_range_tier<R: Rng + ?Sized>(
    energy: u32,
    costs: &RangeCosts,
    policy: TierPolicy,
    preferred: RangeTier,
    rng: &mut R,
) -> Option<RangeTier> {
    let affordable = costs.affordable(energy);
    let most_expensive = || affordable.iter().copied().max_by_key(|t| costs.cost(*t));

    match policy {
        TierPolicy::Random => affordable.choose(rng).copied(),
        TierPolicy::Maximum => most_expensive(),
        TierPolicy::Fixed if affordable.contains(&preferred) => Some(preferred),
        TierPolicy::Fixed => most_expensive(),
    }
}
