//! Championship-qualification tiers, from elimination depth.

use crate::ingest::standardize::ladder_index;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidLevel {
    Full,
    Partial,
}

impl BidLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            BidLevel::Full => "Full",
            BidLevel::Partial => "Partial",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bid {
    pub level: BidLevel,
    pub ghost: bool,
}

/// Assigns a bid from the standardized name of the last elimination round an
/// entry reached. A same-school elimination matchup manufactures one extra
/// win for whichever entry advances, so the ghost condition relaxes the
/// qualifying threshold by exactly one round.
///
/// Both round names must be on the ladder; callers resolve them through the
/// standardizer first.
pub fn assign_bid(
    last_elim_reached: &str,
    full_bid_round: &str,
    has_partial_bids: bool,
    ghost: bool,
) -> Option<Bid> {
    let reached = ladder_index(last_elim_reached)?;
    let full = ladder_index(full_bid_round)? + usize::from(ghost);

    if reached <= full {
        return Some(Bid {
            level: BidLevel::Full,
            ghost,
        });
    }

    if has_partial_bids && reached <= full + 1 {
        return Some(Bid {
            level: BidLevel::Partial,
            ghost,
        });
    }

    None
}
