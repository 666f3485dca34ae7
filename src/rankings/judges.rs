//! Per-scope judge quality index ("Index") pass.
//!
//! Reads the scope's already-aggregated team OTR values through
//! [`TeamOtrReader`], so [`super::teams::rank_teams`] must have completed
//! for the scope first.

use std::collections::{HashMap, HashSet};

use diesel::{SqliteConnection, dsl::now, prelude::*};
use uuid::Uuid;

use crate::{
    error::EngineError,
    rankings::{Scope, TeamOtrReader},
    schema::{
        division_circuits, divisions, judge_rankings, judge_records,
        round_speaking, rounds,
    },
    stats,
};

/// Points fallback when a scope has no recorded speaking at all.
const DEFAULT_SCOPE_POINTS: f64 = 28.5;

/// Expected win probabilities for a matchup, from aggregated OTR. The
/// higher-OTR side gets the high probability, capped at 0.99.
pub fn expected_win_probabilities(otr_one: f64, otr_two: f64) -> (f64, f64) {
    let avg = (otr_one + otr_two) / 2.0;
    if avg <= 0.0 {
        return (0.5, 0.5);
    }

    let wp_high =
        ((1.2 * (otr_one - otr_two).abs()).powi(2) / avg + 0.5).min(0.99);
    let wp_low = 1.0 - wp_high;

    if otr_one >= otr_two {
        (wp_high, wp_low)
    } else {
        (wp_low, wp_high)
    }
}

/// Confidence that the higher-OTR side should have won, on the screw scale.
pub fn upset_confidence(otr_one: f64, otr_two: f64) -> f64 {
    let delta = (otr_one - otr_two).abs();
    let avg = (otr_one + otr_two) / 2.0;
    if avg <= 0.0 {
        return 0.5;
    }

    (1.47 * delta.powf(0.8094) * (1.0 / (4.0 * avg)))
        / (1.0 + 2f64.powi(-4))
        + 0.5
}

/// Screw factor for a decided prelim round: nonzero only when the
/// statistically weaker side won against a high-confidence expectation.
pub fn screw_factor(otr_winner: f64, otr_loser: f64) -> f64 {
    if otr_winner < otr_loser
        && upset_confidence(otr_winner, otr_loser) >= 0.7
    {
        4.5f64.powf((0.5 - otr_winner).abs()) - 1.0
    } else {
        0.0
    }
}

/// Raw index: 10 minus weighted anomaly incidence. Deliberately unclamped;
/// the index deflator pulls extremes back in.
pub fn raw_index(squirrels: i64, screws: i64, records: i64) -> f64 {
    10.0 - (13.0 * squirrels as f64 + 7.0 * screws as f64) / records as f64
}

/// Sample-size deflator: spans [0.9125, 1.0), so a judge seen in only a
/// handful of rounds cannot post an extreme index.
pub fn round_count_deflator(records: usize) -> f64 {
    0.1 / (7.0 * (-0.3 * (records as f64 - 1.0)).exp() + 1.0) + 0.9
}

/// Raw-score deflator: pulls extreme raw indices toward the center.
pub fn index_deflator(raw: f64) -> f64 {
    2.2 / ((2.2 / 0.2 - 1.0) * (-0.3 * (raw - 3.0)).exp() + 1.0)
}

pub fn final_index(raw: f64, records: usize) -> f64 {
    raw * round_count_deflator(records) * index_deflator(raw)
}

#[derive(Queryable)]
struct RecordRow {
    id: String,
    division_id: String,
    round_name_std: String,
    kind: String,
    decision: String,
    was_squirrel: bool,
    team_one_id: String,
    team_two_id: Option<String>,
    winner_id: Option<String>,
}

/// Recomputes the index for every judge with records in the scope.
/// Idempotent: rankings are fully recomputed and upserted in place, and the
/// round/record write-backs converge on the same values for unchanged
/// inputs. A failure on one judge skips that judge and continues.
#[tracing::instrument(skip(conn))]
pub fn rank_judges(
    conn: &mut SqliteConnection,
    scope: Scope,
) -> Result<usize, EngineError> {
    let scope_avg: Option<f64> = round_speaking::table
        .inner_join(
            rounds::table.on(round_speaking::round_id.eq(rounds::id)),
        )
        .inner_join(
            divisions::table.on(rounds::division_id.eq(divisions::id)),
        )
        .inner_join(
            division_circuits::table
                .on(division_circuits::division_id.eq(divisions::id)),
        )
        .filter(division_circuits::circuit_id.eq(scope.circuit_id))
        .filter(divisions::season_id.eq(scope.season_id))
        .select(diesel::dsl::avg(round_speaking::points))
        .first(conn)?;
    let scope_avg = scope_avg.unwrap_or(DEFAULT_SCOPE_POINTS);

    let judge_ids: Vec<String> = judge_records::table
        .inner_join(
            divisions::table.on(judge_records::division_id.eq(divisions::id)),
        )
        .inner_join(
            division_circuits::table
                .on(division_circuits::division_id.eq(divisions::id)),
        )
        .filter(division_circuits::circuit_id.eq(scope.circuit_id))
        .filter(divisions::season_id.eq(scope.season_id))
        .select(judge_records::judge_id)
        .distinct()
        .order(judge_records::judge_id.asc())
        .load(conn)?;

    let mut reader = TeamOtrReader::new(scope);
    let mut written = 0usize;

    for judge_id in judge_ids {
        match rank_one_judge(conn, scope, &judge_id, scope_avg, &mut reader) {
            Ok(true) => written += 1,
            Ok(false) => {}
            Err(error) => {
                tracing::error!(
                    %judge_id,
                    circuit_id = scope.circuit_id,
                    season_id = scope.season_id,
                    %error,
                    "failed to recompute judge index"
                );
            }
        }
    }

    tracing::info!(judges = written, "judge indices recomputed");
    Ok(written)
}

fn rank_one_judge(
    conn: &mut SqliteConnection,
    scope: Scope,
    judge_id: &str,
    scope_avg: f64,
    reader: &mut TeamOtrReader,
) -> Result<bool, EngineError> {
    let records: Vec<RecordRow> = judge_records::table
        .inner_join(
            divisions::table.on(judge_records::division_id.eq(divisions::id)),
        )
        .inner_join(
            division_circuits::table
                .on(division_circuits::division_id.eq(divisions::id)),
        )
        .filter(division_circuits::circuit_id.eq(scope.circuit_id))
        .filter(divisions::season_id.eq(scope.season_id))
        .filter(judge_records::judge_id.eq(judge_id))
        .filter(judge_records::team_two_id.is_not_null())
        .select((
            judge_records::id,
            judge_records::division_id,
            judge_records::round_name_std,
            judge_records::kind,
            judge_records::decision,
            judge_records::was_squirrel,
            judge_records::team_one_id,
            judge_records::team_two_id,
            judge_records::winner_id,
        ))
        .load(conn)?;

    if records.is_empty() {
        tracing::info!(%judge_id, "no two-team records in scope; skipping");
        return Ok(false);
    }

    let mut tourns: HashSet<&str> = HashSet::new();
    let mut prelims = 0i64;
    let mut elims = 0i64;
    let mut pro_decisions = 0i64;
    let mut squirrel_sum = 0i64;
    let mut screw_sum = 0i64;
    let mut low_point_wins = 0i64;
    let mut all_points: Vec<f64> = Vec::new();

    for record in &records {
        // The is_not_null filter guarantees a second team.
        let team_two = record.team_two_id.as_deref().unwrap();

        tourns.insert(&record.division_id);
        if record.kind == "P" {
            prelims += 1;
        } else {
            elims += 1;
        }
        if record.decision == "Pro" {
            pro_decisions += 1;
        }
        if record.was_squirrel {
            squirrel_sum += 1;
        }

        // Both perspectives of the debate, for write-backs and per-team
        // point averages.
        let matchup_rounds: Vec<(String, String)> = rounds::table
            .filter(rounds::division_id.eq(&record.division_id))
            .filter(rounds::name_std.eq(&record.round_name_std))
            .filter(
                rounds::team_id
                    .eq_any([record.team_one_id.as_str(), team_two]),
            )
            .select((rounds::id, rounds::team_id))
            .load(conn)?;

        let round_ids: Vec<&str> =
            matchup_rounds.iter().map(|(id, _)| id.as_str()).collect();
        let speaks: Vec<(String, f64)> = round_speaking::table
            .filter(round_speaking::round_id.eq_any(round_ids))
            .filter(round_speaking::judge_id.eq(judge_id))
            .select((round_speaking::round_id, round_speaking::points))
            .load(conn)?;

        let team_of_round: HashMap<&str, &str> = matchup_rounds
            .iter()
            .map(|(id, team)| (id.as_str(), team.as_str()))
            .collect();

        let mut points_one = Vec::new();
        let mut points_two = Vec::new();
        for (round_id, points) in &speaks {
            all_points.push(*points);
            match team_of_round.get(round_id.as_str()) {
                Some(team) if *team == record.team_one_id => {
                    points_one.push(*points);
                }
                Some(_) => points_two.push(*points),
                None => {}
            }
        }

        if let (Some(avg_one), Some(avg_two), Some(winner)) = (
            stats::mean(&points_one),
            stats::mean(&points_two),
            record.winner_id.as_deref(),
        ) {
            let one_outspoke_two = avg_one > avg_two;
            if (one_outspoke_two && winner == team_two)
                || (avg_two > avg_one && winner == record.team_one_id)
            {
                low_point_wins += 1;
            }
        }

        let otr_one = reader.otr(&record.team_one_id, conn)?;
        let otr_two = reader.otr(team_two, conn)?;
        let (Some(otr_one), Some(otr_two)) = (otr_one, otr_two) else {
            tracing::info!(
                record_id = %record.id,
                "missing team OTR; expected win probability left unset"
            );
            continue;
        };

        let (wp_one, wp_two) = expected_win_probabilities(otr_one, otr_two);
        for (round_id, team) in &matchup_rounds {
            let wp = if *team == record.team_one_id {
                wp_one
            } else {
                wp_two
            };
            diesel::update(rounds::table.filter(rounds::id.eq(round_id)))
                .set(rounds::expected_win_probability.eq(wp))
                .execute(conn)?;
        }

        if record.kind == "P" {
            let factor = match record.winner_id.as_deref() {
                Some(winner) if winner == record.team_one_id => {
                    screw_factor(otr_one, otr_two)
                }
                Some(_) => screw_factor(otr_two, otr_one),
                // Splits have no winner to screw.
                None => 0.0,
            };

            diesel::update(
                judge_records::table.filter(judge_records::id.eq(&record.id)),
            )
            .set(judge_records::screw_factor.eq(factor))
            .execute(conn)?;

            if factor > 0.0 {
                screw_sum += 1;
            }
        }
    }

    let num_records = records.len() as i64;
    let raw = raw_index(squirrel_sum, screw_sum, num_records);
    let index = final_index(raw, records.len());

    let avg_spks = stats::mean(&all_points);
    let std_spks = stats::sample_std_dev(&all_points);
    let spks_above_avg = avg_spks.map(|avg| avg - scope_avg);

    diesel::insert_into(judge_rankings::table)
        .values((
            judge_rankings::id.eq(Uuid::now_v7().to_string()),
            judge_rankings::judge_id.eq(judge_id),
            judge_rankings::circuit_id.eq(scope.circuit_id),
            judge_rankings::season_id.eq(scope.season_id),
            judge_rankings::index.eq(index),
            judge_rankings::tourns.eq(tourns.len() as i64),
            judge_rankings::rounds.eq(num_records),
            judge_rankings::prelims.eq(prelims),
            judge_rankings::elims.eq(elims),
            judge_rankings::squirrels.eq(squirrel_sum),
            judge_rankings::squirrel_pct
                .eq(squirrel_sum as f64 / num_records as f64),
            judge_rankings::screws.eq(screw_sum),
            judge_rankings::screw_pct
                .eq(screw_sum as f64 / num_records as f64),
            judge_rankings::avg_spks.eq(avg_spks),
            judge_rankings::std_spks.eq(std_spks),
            judge_rankings::pct_pro
                .eq(pro_decisions as f64 / num_records as f64),
            judge_rankings::low_point_wins.eq(low_point_wins),
            judge_rankings::low_point_win_pct
                .eq(low_point_wins as f64 / num_records as f64),
            judge_rankings::spks_above_avg.eq(spks_above_avg),
            judge_rankings::updated_at.eq(now),
        ))
        .on_conflict((
            judge_rankings::judge_id,
            judge_rankings::circuit_id,
            judge_rankings::season_id,
        ))
        .do_update()
        .set((
            judge_rankings::index.eq(index),
            judge_rankings::tourns.eq(tourns.len() as i64),
            judge_rankings::rounds.eq(num_records),
            judge_rankings::prelims.eq(prelims),
            judge_rankings::elims.eq(elims),
            judge_rankings::squirrels.eq(squirrel_sum),
            judge_rankings::squirrel_pct
                .eq(squirrel_sum as f64 / num_records as f64),
            judge_rankings::screws.eq(screw_sum),
            judge_rankings::screw_pct
                .eq(screw_sum as f64 / num_records as f64),
            judge_rankings::avg_spks.eq(avg_spks),
            judge_rankings::std_spks.eq(std_spks),
            judge_rankings::pct_pro
                .eq(pro_decisions as f64 / num_records as f64),
            judge_rankings::low_point_wins.eq(low_point_wins),
            judge_rankings::low_point_win_pct
                .eq(low_point_wins as f64 / num_records as f64),
            judge_rankings::spks_above_avg.eq(spks_above_avg),
            judge_rankings::updated_at.eq(now),
        ))
        .execute(conn)?;

    Ok(true)
}
