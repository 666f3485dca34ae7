//! Collapses per-entry judge ballots into one record per judge per debate.
//!
//! Each debate is seen twice during ingestion (once from each entry's
//! perspective). Records are keyed by (judge, standardized round, matchup
//! identity) so both perspectives land on the same record, with their
//! speaking points merged.

use indexmap::IndexMap;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};

use crate::{
    identity::entity_id,
    ingest::{
        outcome::{Outcome, Side},
        standardize::RoundKind,
    },
    stats,
};

pub fn round2(value: f64) -> f64 {
    Decimal::from_f64(value)
        .and_then(|d| d.round_dp(2).to_f64())
        .unwrap_or(value)
}

#[derive(Debug, Clone)]
pub struct MatchupRecord {
    pub judge_id: String,
    pub judge_name: String,
    pub tab_judge_id: i64,
    pub round_name_std: String,
    pub kind: RoundKind,
    pub decision: Side,
    pub was_squirrel: bool,
    pub team_one_id: String,
    pub team_two_id: Option<String>,
    pub winner_id: Option<String>,
    pub points: Vec<f64>,
}

impl MatchupRecord {
    pub fn avg_points(&self) -> Option<f64> {
        stats::mean(&self.points).map(round2)
    }
}

#[derive(Debug, Clone)]
pub struct BallotView<'a> {
    pub judge_id: &'a str,
    pub judge_name: &'a str,
    pub tab_judge_id: i64,
    pub decision: Side,
    pub was_squirrel: bool,
    pub points: &'a [f64],
}

#[derive(Default)]
pub struct MatchupBook {
    records: IndexMap<(String, String, String), MatchupRecord>,
}

impl MatchupBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one ballot as seen from `team_id`'s side of the debate.
    pub fn register(
        &mut self,
        team_id: &str,
        opponent_id: Option<&str>,
        round_name_std: &str,
        kind: RoundKind,
        outcome: Outcome,
        ballot: BallotView<'_>,
    ) {
        let matchup_id = entity_id(&[team_id, opponent_id.unwrap_or("")]);
        let key = (
            ballot.judge_id.to_string(),
            round_name_std.to_string(),
            matchup_id,
        );

        self.records
            .entry(key)
            .and_modify(|record| {
                record.points.extend_from_slice(ballot.points);
            })
            .or_insert_with(|| {
                let winner_id = match outcome {
                    Outcome::Win => Some(team_id.to_string()),
                    Outcome::Loss => opponent_id.map(str::to_string),
                    Outcome::Split => None,
                };

                MatchupRecord {
                    judge_id: ballot.judge_id.to_string(),
                    judge_name: ballot.judge_name.to_string(),
                    tab_judge_id: ballot.tab_judge_id,
                    round_name_std: round_name_std.to_string(),
                    kind,
                    decision: ballot.decision,
                    was_squirrel: ballot.was_squirrel,
                    team_one_id: team_id.to_string(),
                    team_two_id: opponent_id.map(str::to_string),
                    winner_id,
                    points: ballot.points.to_vec(),
                }
            });
    }

    pub fn into_records(self) -> Vec<MatchupRecord> {
        self.records.into_values().collect()
    }
}

/// A judge's speaking and ballot aggregates for one division.
#[derive(Debug, Clone)]
pub struct JudgeDivisionResult {
    pub judge_id: String,
    pub judge_name: String,
    pub tab_judge_id: i64,
    pub avg_raw_points: Option<f64>,
    pub points_1hl: Option<f64>,
    pub avg_adj_points: Option<f64>,
    pub std_dev_points: Option<f64>,
    pub num_prelims: i64,
    pub num_elims: i64,
    pub num_squirrels: i64,
    pub num_pro: i64,
    pub num_con: i64,
}

pub fn judge_division_results(
    records: &[MatchupRecord],
) -> Vec<JudgeDivisionResult> {
    let mut by_judge: IndexMap<&str, Vec<&MatchupRecord>> = IndexMap::new();
    for record in records {
        by_judge
            .entry(record.judge_id.as_str())
            .or_default()
            .push(record);
    }

    by_judge
        .into_iter()
        .map(|(judge_id, records)| {
            let mut result = JudgeDivisionResult {
                judge_id: judge_id.to_string(),
                judge_name: records[0].judge_name.clone(),
                tab_judge_id: records[0].tab_judge_id,
                avg_raw_points: None,
                points_1hl: None,
                avg_adj_points: None,
                std_dev_points: None,
                num_prelims: 0,
                num_elims: 0,
                num_squirrels: 0,
                num_pro: 0,
                num_con: 0,
            };

            let mut points = Vec::new();
            for record in &records {
                match record.kind {
                    RoundKind::Prelim => result.num_prelims += 1,
                    RoundKind::Elim => result.num_elims += 1,
                }
                match record.decision {
                    Side::Pro => result.num_pro += 1,
                    Side::Con => result.num_con += 1,
                    Side::Bye => {}
                }
                if record.was_squirrel {
                    result.num_squirrels += 1;
                }
                points.extend_from_slice(&record.points);
            }

            if points.len() > 1 {
                result.avg_raw_points = stats::mean(&points).map(round2);
                result.avg_adj_points =
                    stats::iqr_trimmed_mean(&points).map(round2);
                result.std_dev_points =
                    stats::sample_std_dev(&points).map(round2);
                result.points_1hl =
                    stats::hi_lo_trimmed_mean(&points, 1).map(round2);
            }

            result
        })
        .collect()
}
