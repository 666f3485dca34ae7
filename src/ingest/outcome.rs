//! Resolves a round's win/loss/split outcome, and the per-ballot anomaly
//! flag, from raw judge ballots.

use crate::error::EntryError;

const PRO_SIDES: [&str; 6] =
    ["Pro", "Aff", "Govt", "Gov", "Prop", "Proposition"];
const CON_SIDES: [&str; 4] = ["Con", "Neg", "Opp", "Opposition"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Pro,
    Con,
    Bye,
}

impl Side {
    /// Standardizes a raw side label. Tab software is inconsistent about
    /// format vocabulary (aff/neg, gov/opp, prop/con), and an empty label
    /// marks a bye.
    pub fn parse(raw: &str) -> Result<Side, EntryError> {
        if raw.is_empty() {
            return Ok(Side::Bye);
        }

        let mut chars = raw.chars();
        let first = chars.next().expect("non-empty side label");
        let normalized: String = first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect();

        if PRO_SIDES.contains(&normalized.as_str()) {
            Ok(Side::Pro)
        } else if CON_SIDES.contains(&normalized.as_str()) {
            Ok(Side::Con)
        } else if normalized == "Bye" {
            Ok(Side::Bye)
        } else {
            Err(EntryError::UnrecognizedSide {
                side: raw.to_string(),
            })
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Pro => Side::Con,
            Side::Con => Side::Pro,
            Side::Bye => Side::Bye,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Pro => "Pro",
            Side::Con => "Con",
            Side::Bye => "Bye",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Win,
    Loss,
}

impl Vote {
    pub fn parse(raw: &str) -> Result<Vote, EntryError> {
        match raw {
            "W" | "Win" => Ok(Vote::Win),
            "L" | "Loss" => Ok(Vote::Loss),
            other => Err(EntryError::UnrecognizedVote {
                vote: other.to_string(),
            }),
        }
    }

    /// The side this ballot voted for, given the side of the entry it was
    /// recorded against.
    pub fn decision(self, side: Side) -> Side {
        match self {
            Vote::Win => side,
            Vote::Loss => side.opposite(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Split,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Loss => "Loss",
            Outcome::Split => "Split",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResolvedBallot {
    pub decision: Side,
    pub was_squirrel: bool,
}

#[derive(Debug, Clone)]
pub struct ResolvedRound {
    pub outcome: Outcome,
    pub ballots_won: i64,
    pub ballots_lost: i64,
    pub ballots: Vec<ResolvedBallot>,
}

/// Resolves a round from the entry's perspective. Byes are unconditional
/// wins with no ballots; otherwise the panel majority decides, a tie
/// (including the degenerate zero-ballot case) is a split, and each ballot
/// disagreeing with the resolved outcome is flagged as a squirrel.
pub fn resolve_round(side: Side, votes: &[Vote]) -> ResolvedRound {
    if side == Side::Bye {
        return ResolvedRound {
            outcome: Outcome::Win,
            ballots_won: 0,
            ballots_lost: 0,
            ballots: Vec::new(),
        };
    }

    let ballots_won =
        votes.iter().filter(|vote| **vote == Vote::Win).count() as i64;
    let ballots_lost = votes.len() as i64 - ballots_won;

    let outcome = if ballots_won > ballots_lost {
        Outcome::Win
    } else if ballots_won < ballots_lost {
        Outcome::Loss
    } else {
        Outcome::Split
    };

    let ballots = votes
        .iter()
        .map(|vote| {
            let decision = vote.decision(side);
            let was_squirrel = match outcome {
                Outcome::Win => decision != side,
                Outcome::Loss => decision == side,
                Outcome::Split => false,
            };
            ResolvedBallot {
                decision,
                was_squirrel,
            }
        })
        .collect();

    ResolvedRound {
        outcome,
        ballots_won,
        ballots_lost,
        ballots,
    }
}
