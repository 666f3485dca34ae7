//! Per-division ingestion: turns an extraction record set into persisted
//! results, rounds, judge records and seeds.

use std::collections::HashMap;
use std::path::Path;

use diesel::{SqliteConnection, dsl::now, prelude::*};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, ensure};
use uuid::Uuid;

use crate::{
    error::{
        AlreadyIngestedSnafu, DecodeRecordSetSnafu, EngineError, EntryError,
        ManifestSnafu, ReadInputSnafu, UnknownBracketRoundSnafu,
    },
    identity::{entity_id, person_id},
    ingest::{
        bids::Bid,
        outcome::{Outcome, Side, Vote, resolve_round},
        records::{BallotView, MatchupBook, MatchupRecord, round2},
        standardize::{RoundKind, RoundNameBook, classify, ladder_index},
    },
    schema::{
        competitors, division_circuits, divisions, judge_records,
        judge_results, judges, round_speaking, rounds, speaker_results,
        team_competitors, team_results, teams,
    },
    scoring::{self, CompositeInputs},
    stats,
};

pub mod bids;
pub mod outcome;
pub mod records;
pub mod standardize;

/// One division's record set, as handed over by the extraction
/// collaborator. Every entry's rounds are listed in the order they were
/// debated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSet {
    pub tab_tourn_id: i64,
    pub tab_event_id: i64,
    pub tournament: String,
    pub entries: Vec<RawEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntry {
    pub tab_entry_id: i64,
    pub code: String,
    pub school: String,
    #[serde(default)]
    pub location: Option<String>,
    pub competitors: Vec<String>,
    pub rounds: Vec<RawRound>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRound {
    pub name: String,
    pub side: String,
    #[serde(default)]
    pub opponent_tab_entry_id: Option<i64>,
    #[serde(default)]
    pub ballots: Vec<RawBallot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBallot {
    pub judge_name: String,
    pub tab_judge_id: i64,
    pub vote: String,
    #[serde(default)]
    pub speaking: Vec<RawSpeaking>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSpeaking {
    pub competitor: String,
    pub points: f64,
}

/// Division-level configuration supplied alongside the record set (the
/// manifest knows things Tabroom doesn't publish: circuits, season, boost,
/// bid thresholds).
#[derive(Debug, Clone)]
pub struct DivisionConfig {
    pub nickname: String,
    pub event: String,
    pub classification: String,
    pub division_name: String,
    pub season_id: i64,
    pub circuit_ids: Vec<i64>,
    pub boost: f64,
    pub first_elim_round: Option<String>,
    pub full_bid_round: Option<String>,
    pub has_partial_bids: bool,
}

/// One row of the ingest manifest CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestRow {
    pub nickname: String,
    pub tab_tourn_id: i64,
    pub tab_event_id: i64,
    pub event: String,
    pub classification: String,
    pub division_name: String,
    pub season_id: i64,
    pub circuits: String,
    #[serde(default)]
    pub first_elim_round: Option<String>,
    #[serde(default)]
    pub full_bid_round: Option<String>,
    pub boost: f64,
    pub records: String,
}

fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "None")
}

impl ManifestRow {
    pub fn config(&self) -> DivisionConfig {
        DivisionConfig {
            nickname: self.nickname.clone(),
            event: self.event.clone(),
            classification: self.classification.clone(),
            division_name: self.division_name.clone(),
            season_id: self.season_id,
            circuit_ids: self
                .circuits
                .split(';')
                .filter_map(|c| c.trim().parse().ok())
                .collect(),
            boost: self.boost,
            first_elim_round: none_if_empty(self.first_elim_round.clone()),
            full_bid_round: none_if_empty(self.full_bid_round.clone()),
            // Only PF awards silver bids.
            has_partial_bids: self.event == "PublicForum",
        }
    }
}

pub fn read_manifest(path: &Path) -> Result<Vec<ManifestRow>, EngineError> {
    let mut reader =
        csv::Reader::from_path(path).context(ManifestSnafu { path })?;
    reader
        .deserialize()
        .collect::<Result<Vec<ManifestRow>, _>>()
        .context(ManifestSnafu { path })
}

pub fn read_record_set(path: &Path) -> Result<RecordSet, EngineError> {
    let raw =
        std::fs::read_to_string(path).context(ReadInputSnafu { path })?;
    serde_json::from_str(&raw).context(DecodeRecordSetSnafu { path })
}

struct PreparedBallot {
    judge_id: String,
    judge_name: String,
    tab_judge_id: i64,
    decision: Side,
    was_squirrel: bool,
    speaking: Vec<(String, f64)>,
}

struct PreparedRound {
    name: String,
    name_std: String,
    kind: RoundKind,
    side: Side,
    outcome: Outcome,
    ballots_won: i64,
    ballots_lost: i64,
    opponent_tab_id: Option<i64>,
    ballots: Vec<PreparedBallot>,
}

struct PreparedEntry {
    team_id: String,
    tab_entry_id: i64,
    code: String,
    school: String,
    location: Option<String>,
    competitors: Vec<(String, String)>,
    prelim_wins: f64,
    prelim_losses: f64,
    prelim_ballots_won: i64,
    prelim_ballots_lost: i64,
    elim_wins: i64,
    elim_losses: i64,
    elim_ballots_won: i64,
    elim_ballots_lost: i64,
    rounds: Vec<PreparedRound>,
    last_elim: Option<usize>,
    op_wp_m: Option<f64>,
    otr_comp: Option<f64>,
    bid: Option<Bid>,
    prelim_pos: Option<i64>,
}

fn prepare_entry(
    raw: &RawEntry,
    book: &mut RoundNameBook,
) -> Result<PreparedEntry, EntryError> {
    let mut entry = PreparedEntry {
        team_id: entity_id(
            &raw.competitors.iter().map(String::as_str).collect::<Vec<_>>(),
        ),
        tab_entry_id: raw.tab_entry_id,
        code: raw.code.clone(),
        school: raw.school.clone(),
        location: raw.location.clone(),
        competitors: raw
            .competitors
            .iter()
            .map(|name| (person_id(name), name.clone()))
            .collect(),
        prelim_wins: 0.0,
        prelim_losses: 0.0,
        prelim_ballots_won: 0,
        prelim_ballots_lost: 0,
        elim_wins: 0,
        elim_losses: 0,
        elim_ballots_won: 0,
        elim_ballots_lost: 0,
        rounds: Vec::new(),
        last_elim: None,
        op_wp_m: None,
        otr_comp: None,
        bid: None,
        prelim_pos: None,
    };

    let mut prelim_seq = 0usize;
    let mut elim_step = 0usize;

    for raw_round in &raw.rounds {
        let kind = classify(&raw_round.name)?;
        let side = Side::parse(&raw_round.side)?;

        let name_std = match kind {
            RoundKind::Prelim => {
                let std = book.standardize_prelim(&raw_round.name, prelim_seq);
                prelim_seq += 1;
                std
            }
            RoundKind::Elim => {
                let std = book.standardize_elim(&raw_round.name, elim_step)?;
                elim_step += 1;
                std
            }
        };

        let votes = raw_round
            .ballots
            .iter()
            .map(|ballot| Vote::parse(&ballot.vote))
            .collect::<Result<Vec<_>, _>>()?;
        let resolved = resolve_round(side, &votes);

        match kind {
            RoundKind::Prelim => {
                match resolved.outcome {
                    Outcome::Win => entry.prelim_wins += 1.0,
                    Outcome::Loss => entry.prelim_losses += 1.0,
                    Outcome::Split => {
                        entry.prelim_wins += 0.5;
                        entry.prelim_losses += 0.5;
                    }
                }
                entry.prelim_ballots_won += resolved.ballots_won;
                entry.prelim_ballots_lost += resolved.ballots_lost;
            }
            RoundKind::Elim => {
                match resolved.outcome {
                    Outcome::Win => entry.elim_wins += 1,
                    Outcome::Loss => entry.elim_losses += 1,
                    Outcome::Split => {}
                }
                entry.elim_ballots_won += resolved.ballots_won;
                entry.elim_ballots_lost += resolved.ballots_lost;
                entry.last_elim = Some(entry.rounds.len());
            }
        }

        let ballots = raw_round
            .ballots
            .iter()
            .zip(&resolved.ballots)
            .map(|(raw_ballot, resolved_ballot)| PreparedBallot {
                judge_id: person_id(&raw_ballot.judge_name),
                judge_name: raw_ballot.judge_name.clone(),
                tab_judge_id: raw_ballot.tab_judge_id,
                decision: resolved_ballot.decision,
                was_squirrel: resolved_ballot.was_squirrel,
                speaking: raw_ballot
                    .speaking
                    .iter()
                    .map(|speak| (speak.competitor.clone(), speak.points))
                    .collect(),
            })
            .collect();

        entry.rounds.push(PreparedRound {
            name: raw_round.name.clone(),
            name_std,
            kind,
            side,
            outcome: resolved.outcome,
            ballots_won: resolved.ballots_won,
            ballots_lost: resolved.ballots_lost,
            opponent_tab_id: raw_round.opponent_tab_entry_id,
            ballots,
        });
    }

    Ok(entry)
}

fn assign_bids(
    prepared: &mut [PreparedEntry],
    school_of_tab: &HashMap<i64, String>,
    config: &DivisionConfig,
) {
    let Some(full_bid_round) = config.full_bid_round.as_deref() else {
        return;
    };

    for entry in prepared.iter_mut() {
        let Some(last_elim) = entry.last_elim else {
            continue;
        };
        let last = &entry.rounds[last_elim];

        let opponent_school = last
            .opponent_tab_id
            .and_then(|tab_id| school_of_tab.get(&tab_id));
        let Some(opponent_school) = opponent_school else {
            tracing::info!(
                code = %entry.code,
                "no opponent school for the last elimination round; skipping bid"
            );
            continue;
        };

        let ghost = *opponent_school == entry.school;
        if ghost {
            tracing::info!(
                code = %entry.code,
                school = %entry.school,
                "same-school elimination matchup; relaxing bid threshold"
            );
        }

        entry.bid = bids::assign_bid(
            &last.name_std,
            full_bid_round,
            config.has_partial_bids,
            ghost,
        );
    }
}

fn score_entries(prepared: &mut [PreparedEntry], config: &DivisionConfig) {
    let prelim_ballots_of_tab: HashMap<i64, (i64, i64)> = prepared
        .iter()
        .map(|entry| {
            (
                entry.tab_entry_id,
                (entry.prelim_ballots_won, entry.prelim_ballots_lost),
            )
        })
        .collect();

    for entry in prepared.iter_mut() {
        let Some(p_wp) = scoring::ballot_win_pct(
            entry.prelim_ballots_won,
            entry.prelim_ballots_lost,
        ) else {
            continue;
        };

        let mut opponent_pwps = Vec::new();
        let mut rxr = 0.0;

        for round in &entry.rounds {
            let Some(&(op_won, op_lost)) = round
                .opponent_tab_id
                .and_then(|tab_id| prelim_ballots_of_tab.get(&tab_id))
            else {
                continue;
            };
            let Some(op_pwp) = scoring::ballot_win_pct(op_won, op_lost) else {
                continue;
            };

            opponent_pwps.push(op_pwp);

            if round.kind == RoundKind::Prelim
                && round.outcome == Outcome::Win
            {
                rxr += scoring::upset_reward(op_pwp - p_wp);
            }
        }

        entry.op_wp_m = stats::mean(&opponent_pwps);
        entry.otr_comp = entry.op_wp_m.map(|op_wp_m| {
            scoring::composite_score(&CompositeInputs {
                p_wp,
                break_boost: (entry.elim_wins + entry.elim_losses + 1) as f64,
                op_wp_m,
                tournament_boost: config.boost,
                rxr,
            })
        });
    }
}

fn assign_seeds(prepared: &mut [PreparedEntry]) {
    let mut ranked: Vec<usize> = (0..prepared.len())
        .filter(|&i| {
            prepared[i].otr_comp.is_some() && prepared[i].op_wp_m.is_some()
        })
        .collect();

    // The filter above guarantees both components exist.
    ranked.sort_by(|&a, &b| {
        let (comp_a, op_a) =
            (prepared[a].otr_comp.unwrap(), prepared[a].op_wp_m.unwrap());
        let (comp_b, op_b) =
            (prepared[b].otr_comp.unwrap(), prepared[b].op_wp_m.unwrap());
        comp_b.total_cmp(&comp_a).then(op_b.total_cmp(&op_a))
    });

    for (position, index) in ranked.into_iter().enumerate() {
        prepared[index].prelim_pos = Some(position as i64 + 1);
    }
}

#[derive(Debug)]
pub struct IngestSummary {
    pub division_id: String,
    pub entries: usize,
    pub entries_skipped: usize,
    pub judge_records: usize,
}

/// Ingests one division. Per-entry failures (unrecognized sides, ladder
/// underflows) skip that entry and keep going; everything that survives is
/// written in a single transaction.
#[tracing::instrument(skip_all, fields(tab_event_id = set.tab_event_id))]
pub fn ingest_division(
    conn: &mut SqliteConnection,
    config: &DivisionConfig,
    set: &RecordSet,
) -> Result<IngestSummary, EngineError> {
    let already: i64 = divisions::table
        .filter(divisions::tab_event_id.eq(set.tab_event_id))
        .count()
        .get_result(conn)?;
    ensure!(
        already == 0,
        AlreadyIngestedSnafu {
            tab_event_id: set.tab_event_id
        }
    );

    if let Some(name) = &config.full_bid_round {
        ensure!(
            ladder_index(name).is_some(),
            UnknownBracketRoundSnafu { name: name.clone() }
        );
    }

    let mut book = RoundNameBook::new(config.first_elim_round.as_deref())?;

    let school_of_tab: HashMap<i64, String> = set
        .entries
        .iter()
        .map(|entry| (entry.tab_entry_id, entry.school.clone()))
        .collect();
    let team_of_tab: HashMap<i64, String> = set
        .entries
        .iter()
        .map(|entry| {
            let names: Vec<&str> =
                entry.competitors.iter().map(String::as_str).collect();
            (entry.tab_entry_id, entity_id(&names))
        })
        .collect();

    let mut prepared = Vec::new();
    let mut entries_skipped = 0usize;
    for raw in &set.entries {
        match prepare_entry(raw, &mut book) {
            Ok(entry) => prepared.push(entry),
            Err(error) => {
                entries_skipped += 1;
                tracing::warn!(code = %raw.code, %error, "skipping entry");
            }
        }
    }

    assign_bids(&mut prepared, &school_of_tab, config);
    score_entries(&mut prepared, config);
    assign_seeds(&mut prepared);

    let mut matchups = MatchupBook::new();
    for entry in &prepared {
        for round in &entry.rounds {
            let opponent_id = round
                .opponent_tab_id
                .and_then(|tab_id| team_of_tab.get(&tab_id))
                .map(String::as_str);

            for ballot in &round.ballots {
                let points: Vec<f64> =
                    ballot.speaking.iter().map(|(_, p)| *p).collect();
                matchups.register(
                    &entry.team_id,
                    opponent_id,
                    &round.name_std,
                    round.kind,
                    round.outcome,
                    BallotView {
                        judge_id: &ballot.judge_id,
                        judge_name: &ballot.judge_name,
                        tab_judge_id: ballot.tab_judge_id,
                        decision: ballot.decision,
                        was_squirrel: ballot.was_squirrel,
                        points: &points,
                    },
                );
            }
        }
    }
    let matchup_records = matchups.into_records();
    let judge_division_results =
        records::judge_division_results(&matchup_records);

    let division_id = Uuid::now_v7().to_string();

    conn.transaction::<_, EngineError, _>(|conn| {
        persist_division(conn, &division_id, config, set)?;
        persist_entries(
            conn,
            &division_id,
            &prepared,
            &team_of_tab,
            set.entries.len() as i64,
            config.first_elim_round.is_some(),
        )?;
        persist_judges(
            conn,
            &division_id,
            &matchup_records,
            &judge_division_results,
        )?;
        Ok(())
    })?;

    tracing::info!(
        entries = prepared.len(),
        skipped = entries_skipped,
        records = matchup_records.len(),
        "division ingested"
    );

    Ok(IngestSummary {
        division_id,
        entries: prepared.len(),
        entries_skipped,
        judge_records: matchup_records.len(),
    })
}

fn persist_division(
    conn: &mut SqliteConnection,
    division_id: &str,
    config: &DivisionConfig,
    set: &RecordSet,
) -> Result<(), EngineError> {
    diesel::insert_into(divisions::table)
        .values((
            divisions::id.eq(division_id),
            divisions::tab_tourn_id.eq(set.tab_tourn_id),
            divisions::tab_event_id.eq(set.tab_event_id),
            divisions::name.eq(&set.tournament),
            divisions::nickname.eq(&config.nickname),
            divisions::event.eq(&config.event),
            divisions::classification.eq(&config.classification),
            divisions::division_name.eq(&config.division_name),
            divisions::season_id.eq(config.season_id),
            divisions::boost.eq(config.boost),
            divisions::first_elim_round.eq(config.first_elim_round.as_deref()),
            divisions::full_bid_round.eq(config.full_bid_round.as_deref()),
            divisions::has_partial_bids.eq(config.has_partial_bids),
            divisions::created_at.eq(now),
        ))
        .execute(conn)?;

    let circuit_rows: Vec<_> = config
        .circuit_ids
        .iter()
        .map(|circuit_id| {
            (
                division_circuits::id.eq(Uuid::now_v7().to_string()),
                division_circuits::division_id.eq(division_id),
                division_circuits::circuit_id.eq(*circuit_id),
            )
        })
        .collect();
    diesel::insert_into(division_circuits::table)
        .values(circuit_rows)
        .execute(conn)?;

    Ok(())
}

fn persist_entries(
    conn: &mut SqliteConnection,
    division_id: &str,
    prepared: &[PreparedEntry],
    team_of_tab: &HashMap<i64, String>,
    pool_size: i64,
    has_bracket: bool,
) -> Result<(), EngineError> {
    for entry in prepared {
        diesel::insert_into(teams::table)
            .values((
                teams::id.eq(&entry.team_id),
                teams::created_at.eq(now),
            ))
            .on_conflict(teams::id)
            .do_nothing()
            .execute(conn)?;

        for (competitor_id, name) in &entry.competitors {
            diesel::insert_into(competitors::table)
                .values((
                    competitors::id.eq(competitor_id),
                    competitors::name.eq(name),
                ))
                .on_conflict(competitors::id)
                .do_nothing()
                .execute(conn)?;
            diesel::insert_into(team_competitors::table)
                .values((
                    team_competitors::id.eq(Uuid::now_v7().to_string()),
                    team_competitors::team_id.eq(&entry.team_id),
                    team_competitors::competitor_id.eq(competitor_id),
                ))
                .on_conflict((
                    team_competitors::team_id,
                    team_competitors::competitor_id,
                ))
                .do_nothing()
                .execute(conn)?;
        }

        let result_id = Uuid::now_v7().to_string();
        diesel::insert_into(team_results::table)
            .values((
                team_results::id.eq(&result_id),
                team_results::division_id.eq(division_id),
                team_results::team_id.eq(&entry.team_id),
                team_results::tab_entry_id.eq(entry.tab_entry_id),
                team_results::code.eq(&entry.code),
                team_results::school.eq(&entry.school),
                team_results::location.eq(entry.location.as_deref()),
                team_results::prelim_pos.eq(entry.prelim_pos),
                team_results::prelim_pool_size.eq(pool_size),
                team_results::prelim_wins.eq(entry.prelim_wins),
                team_results::prelim_losses.eq(entry.prelim_losses),
                team_results::prelim_ballots_won.eq(entry.prelim_ballots_won),
                team_results::prelim_ballots_lost
                    .eq(entry.prelim_ballots_lost),
                team_results::elim_wins
                    .eq(has_bracket.then_some(entry.elim_wins)),
                team_results::elim_losses
                    .eq(has_bracket.then_some(entry.elim_losses)),
                team_results::elim_ballots_won
                    .eq(has_bracket.then_some(entry.elim_ballots_won)),
                team_results::elim_ballots_lost
                    .eq(has_bracket.then_some(entry.elim_ballots_lost)),
                team_results::op_wp_m.eq(entry.op_wp_m),
                team_results::otr_comp.eq(entry.otr_comp),
                team_results::bid
                    .eq(entry.bid.map(|bid| bid.level.as_str())),
                team_results::ghost_bid.eq(entry.bid.map(|bid| bid.ghost)),
            ))
            .execute(conn)?;

        for round in &entry.rounds {
            let round_id = Uuid::now_v7().to_string();
            let opponent_id = round
                .opponent_tab_id
                .and_then(|tab_id| team_of_tab.get(&tab_id))
                .map(String::as_str);

            diesel::insert_into(rounds::table)
                .values((
                    rounds::id.eq(&round_id),
                    rounds::result_id.eq(&result_id),
                    rounds::division_id.eq(division_id),
                    rounds::team_id.eq(&entry.team_id),
                    rounds::name.eq(&round.name),
                    rounds::name_std.eq(&round.name_std),
                    rounds::kind.eq(round.kind.as_str()),
                    rounds::side.eq(round.side.as_str()),
                    rounds::outcome.eq(round.outcome.as_str()),
                    rounds::ballots_won.eq(round.ballots_won),
                    rounds::ballots_lost.eq(round.ballots_lost),
                    rounds::opponent_id.eq(opponent_id),
                ))
                .execute(conn)?;

            for ballot in &round.ballots {
                diesel::insert_into(judges::table)
                    .values((
                        judges::id.eq(&ballot.judge_id),
                        judges::name.eq(&ballot.judge_name),
                        judges::tab_judge_id.eq(ballot.tab_judge_id),
                    ))
                    .on_conflict(judges::id)
                    .do_nothing()
                    .execute(conn)?;

                let speaking_rows: Vec<_> = ballot
                    .speaking
                    .iter()
                    .map(|(competitor, points)| {
                        (
                            round_speaking::id.eq(Uuid::now_v7().to_string()),
                            round_speaking::round_id.eq(round_id.clone()),
                            round_speaking::competitor_id
                                .eq(person_id(competitor)),
                            round_speaking::judge_id
                                .eq(ballot.judge_id.clone()),
                            round_speaking::points.eq(*points),
                        )
                    })
                    .collect();
                diesel::insert_into(round_speaking::table)
                    .values(speaking_rows)
                    .execute(conn)?;
            }
        }

        // Per-competitor point aggregates for the division.
        let mut points_of_competitor: HashMap<&str, Vec<f64>> = HashMap::new();
        for round in &entry.rounds {
            for ballot in &round.ballots {
                for (competitor, points) in &ballot.speaking {
                    points_of_competitor
                        .entry(competitor.as_str())
                        .or_default()
                        .push(*points);
                }
            }
        }

        for (competitor, points) in points_of_competitor {
            let Some(raw_avg) = stats::mean(&points) else {
                continue;
            };
            let adj_avg = stats::iqr_trimmed_mean(&points).unwrap_or(raw_avg);
            let std_dev = stats::sample_std_dev(&points).unwrap_or(0.0);

            diesel::insert_into(speaker_results::table)
                .values((
                    speaker_results::id.eq(Uuid::now_v7().to_string()),
                    speaker_results::result_id.eq(&result_id),
                    speaker_results::competitor_id.eq(person_id(competitor)),
                    speaker_results::raw_avg_points.eq(round2(raw_avg)),
                    speaker_results::adj_avg_points.eq(round2(adj_avg)),
                    speaker_results::std_dev_points.eq(round2(std_dev)),
                ))
                .execute(conn)?;
        }
    }

    Ok(())
}

fn persist_judges(
    conn: &mut SqliteConnection,
    division_id: &str,
    matchup_records: &[MatchupRecord],
    judge_division_results: &[records::JudgeDivisionResult],
) -> Result<(), EngineError> {
    for record in matchup_records {
        diesel::insert_into(judges::table)
            .values((
                judges::id.eq(&record.judge_id),
                judges::name.eq(&record.judge_name),
                judges::tab_judge_id.eq(record.tab_judge_id),
            ))
            .on_conflict(judges::id)
            .do_nothing()
            .execute(conn)?;

        diesel::insert_into(judge_records::table)
            .values((
                judge_records::id.eq(Uuid::now_v7().to_string()),
                judge_records::division_id.eq(division_id),
                judge_records::judge_id.eq(&record.judge_id),
                judge_records::round_name_std.eq(&record.round_name_std),
                judge_records::kind.eq(record.kind.as_str()),
                judge_records::decision.eq(record.decision.as_str()),
                judge_records::was_squirrel.eq(record.was_squirrel),
                judge_records::team_one_id.eq(&record.team_one_id),
                judge_records::team_two_id.eq(record.team_two_id.as_deref()),
                judge_records::winner_id.eq(record.winner_id.as_deref()),
                judge_records::avg_points.eq(record.avg_points()),
            ))
            .execute(conn)?;
    }

    for result in judge_division_results {
        diesel::insert_into(judge_results::table)
            .values((
                judge_results::id.eq(Uuid::now_v7().to_string()),
                judge_results::division_id.eq(division_id),
                judge_results::judge_id.eq(&result.judge_id),
                judge_results::avg_raw_points.eq(result.avg_raw_points),
                judge_results::points_1hl.eq(result.points_1hl),
                judge_results::avg_adj_points.eq(result.avg_adj_points),
                judge_results::std_dev_points.eq(result.std_dev_points),
                judge_results::num_prelims.eq(result.num_prelims),
                judge_results::num_elims.eq(result.num_elims),
                judge_results::num_squirrels.eq(result.num_squirrels),
                judge_results::num_pro.eq(result.num_pro),
                judge_results::num_con.eq(result.num_con),
            ))
            .execute(conn)?;
    }

    Ok(())
}
