//! Maps tournament-specific round labels onto a canonical elimination-depth
//! taxonomy, and numbers prelims sequentially.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{EngineError, EntryError};

/// The canonical elimination ladder, ordered from the final outwards.
pub const ELIM_ROUND_NAMES: [&str; 7] = [
    "Finals",
    "Semifinals",
    "Quarterfinals",
    "Octofinals",
    "Double Octofinals",
    "Triple Octofinals",
    "Quadruple Octofinals",
];

/// Distance-from-final of a ladder round, 0 = Finals.
pub fn ladder_index(name: &str) -> Option<usize> {
    ELIM_ROUND_NAMES.iter().position(|entry| *entry == name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundKind {
    Prelim,
    Elim,
}

impl RoundKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RoundKind::Prelim => "P",
            RoundKind::Elim => "E",
        }
    }
}

// "r3" and "round 5" are prelims, "runoff" is not; any digit marks a prelim
// unless the label also carries an 'x' ("2x Octos").
static PRELIM_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^r[^u]|round").unwrap());

/// Classifies a raw round label as prelim or elim. Labels starting with
/// `n` belong to novice/JV breakout brackets, which the input contract
/// excludes.
pub fn classify(name: &str) -> Result<RoundKind, EntryError> {
    let lowered = name.to_lowercase();

    if lowered.starts_with('n') {
        return Err(EntryError::BreakoutRound {
            name: name.to_string(),
        });
    }

    if PRELIM_LABEL.is_match(&lowered)
        || (lowered.chars().any(|c| c.is_ascii_digit())
            && !lowered.contains('x'))
    {
        Ok(RoundKind::Prelim)
    } else {
        Ok(RoundKind::Elim)
    }
}

/// Per-division memo of raw label → standardized label. Standardization is
/// driven by whichever entry reaches a round first; every other entry
/// sharing the raw label then agrees on the standardized name, which the
/// judge-record matchup grouping depends on.
pub struct RoundNameBook {
    first_elim_index: Option<usize>,
    memo: IndexMap<String, String>,
}

impl RoundNameBook {
    pub fn new(first_elim_round: Option<&str>) -> Result<Self, EngineError> {
        let first_elim_index = match first_elim_round {
            Some(name) => Some(ladder_index(name).ok_or_else(|| {
                EngineError::UnknownBracketRound {
                    name: name.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            first_elim_index,
            memo: IndexMap::new(),
        })
    }

    /// `seq` counts the entry's prelims chronologically from zero.
    pub fn standardize_prelim(&mut self, raw: &str, seq: usize) -> String {
        self.memo
            .entry(raw.to_string())
            .or_insert_with(|| format!("Round {}", seq + 1))
            .clone()
    }

    /// `step` counts forward from the entry's first elimination round.
    pub fn standardize_elim(
        &mut self,
        raw: &str,
        step: usize,
    ) -> Result<String, EntryError> {
        if let Some(existing) = self.memo.get(raw) {
            return Ok(existing.clone());
        }

        let first = self
            .first_elim_index
            .ok_or(EntryError::UnconfiguredBracket)?;
        let index = first.checked_sub(step).ok_or_else(|| {
            EntryError::LadderUnderflow {
                first: ELIM_ROUND_NAMES[first].to_string(),
                step,
            }
        })?;

        let std = ELIM_ROUND_NAMES[index].to_string();
        self.memo.insert(raw.to_string(), std.clone());
        Ok(std)
    }
}
