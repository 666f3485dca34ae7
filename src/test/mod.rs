//! End-to-end tests: a four-team division driven through ingestion and both
//! aggregation passes against an in-memory database.

use diesel::{Connection, SqliteConnection, prelude::*};
use diesel_migrations::MigrationHarness;

use crate::{
    MIGRATIONS,
    error::EngineError,
    identity::entity_id,
    ingest::{
        self, DivisionConfig, RawBallot, RawEntry, RawRound, RawSpeaking,
        RecordSet,
    },
    rankings::{Scope, judges, teams},
    schema::{
        judge_rankings, judge_results, round_speaking, rounds, speaker_results,
        team_rankings, team_results,
    },
    scoring,
};

fn conn() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:").unwrap();
    conn.run_pending_migrations(MIGRATIONS).unwrap();
    conn
}

fn ballot(
    judge: (&str, i64),
    vote: &str,
    speaking: &[(&str, f64)],
) -> RawBallot {
    RawBallot {
        judge_name: judge.0.to_string(),
        tab_judge_id: judge.1,
        vote: vote.to_string(),
        speaking: speaking
            .iter()
            .map(|(competitor, points)| RawSpeaking {
                competitor: competitor.to_string(),
                points: *points,
            })
            .collect(),
    }
}

fn round(
    name: &str,
    side: &str,
    opponent: Option<i64>,
    ballots: Vec<RawBallot>,
) -> RawRound {
    RawRound {
        name: name.to_string(),
        side: side.to_string(),
        opponent_tab_entry_id: opponent,
        ballots,
    }
}

fn entry(
    tab_entry_id: i64,
    code: &str,
    school: &str,
    competitors: [&str; 2],
    rounds: Vec<RawRound>,
) -> RawEntry {
    RawEntry {
        tab_entry_id,
        code: code.to_string(),
        school: school.to_string(),
        location: None,
        competitors: competitors.iter().map(|c| c.to_string()).collect(),
        rounds,
    }
}

const INGRID: (&str, i64) = ("Ingrid Faber", 501);
const JON: (&str, i64) = ("Jon Geller", 502);
const HARRIET: (&str, i64) = ("Harriet Oduya", 503);
const GAIL: (&str, i64) = ("Gail Peters", 504);

/// Four teams, two prelims, a four-team bracket, plus one entry with an
/// unrecognizable side label.
///
/// Arcadia KL sweeps everything; Greenfield MN loses both prelims on one
/// ballot each but upsets through the bracket to the final; the two
/// Greenfield teams meet in the semifinal (a ghost-bid matchup for the
/// loser); Round 1 between Greenfield QR and Dover ST is a 1-1 split.
fn example_set() -> (DivisionConfig, RecordSet) {
    let config = DivisionConfig {
        nickname: "Example".to_string(),
        event: "PublicForum".to_string(),
        classification: "Varsity".to_string(),
        division_name: "Open PF".to_string(),
        season_id: 2026,
        circuit_ids: vec![9],
        boost: 1.1,
        first_elim_round: Some("Semifinals".to_string()),
        full_bid_round: Some("Finals".to_string()),
        has_partial_bids: true,
    };

    let arcadia = entry(
        1,
        "Arcadia KL",
        "Arcadia",
        ["Kai Lin", "Lena Ortiz"],
        vec![
            round(
                "Round 1",
                "Aff",
                Some(2),
                vec![ballot(
                    INGRID,
                    "W",
                    &[("Kai Lin", 28.5), ("Lena Ortiz", 28.0)],
                )],
            ),
            round(
                "Round 2",
                "Pro",
                Some(3),
                vec![ballot(
                    INGRID,
                    "W",
                    &[("Kai Lin", 28.6), ("Lena Ortiz", 28.2)],
                )],
            ),
            round(
                "Semis",
                "Aff",
                Some(4),
                vec![
                    ballot(
                        INGRID,
                        "W",
                        &[("Kai Lin", 28.7), ("Lena Ortiz", 28.3)],
                    ),
                    ballot(
                        JON,
                        "W",
                        &[("Kai Lin", 28.4), ("Lena Ortiz", 28.1)],
                    ),
                    ballot(
                        HARRIET,
                        "L",
                        &[("Kai Lin", 27.0), ("Lena Ortiz", 27.1)],
                    ),
                ],
            ),
            round(
                "Finals",
                "Pro",
                Some(2),
                vec![
                    ballot(
                        INGRID,
                        "W",
                        &[("Kai Lin", 28.8), ("Lena Ortiz", 28.4)],
                    ),
                    ballot(
                        JON,
                        "W",
                        &[("Kai Lin", 28.9), ("Lena Ortiz", 28.5)],
                    ),
                    ballot(
                        GAIL,
                        "W",
                        &[("Kai Lin", 28.6), ("Lena Ortiz", 28.3)],
                    ),
                ],
            ),
        ],
    );

    let greenfield_mn = entry(
        2,
        "Greenfield MN",
        "Greenfield",
        ["Mia Nguyen", "Noah Park"],
        vec![
            round(
                "Round 1",
                "Neg",
                Some(1),
                vec![ballot(
                    INGRID,
                    "L",
                    &[("Mia Nguyen", 27.5), ("Noah Park", 27.0)],
                )],
            ),
            round(
                "Round 2",
                "Con",
                Some(4),
                vec![ballot(
                    HARRIET,
                    "L",
                    &[("Mia Nguyen", 27.2), ("Noah Park", 27.3)],
                )],
            ),
            round(
                "Semis",
                "Gov",
                Some(3),
                vec![
                    ballot(
                        GAIL,
                        "W",
                        &[("Mia Nguyen", 28.1), ("Noah Park", 28.0)],
                    ),
                    ballot(
                        JON,
                        "W",
                        &[("Mia Nguyen", 28.2), ("Noah Park", 28.3)],
                    ),
                    ballot(
                        HARRIET,
                        "W",
                        &[("Mia Nguyen", 28.0), ("Noah Park", 28.2)],
                    ),
                ],
            ),
            round(
                "Finals",
                "Con",
                Some(1),
                vec![
                    ballot(
                        INGRID,
                        "L",
                        &[("Mia Nguyen", 27.8), ("Noah Park", 27.9)],
                    ),
                    ballot(
                        JON,
                        "L",
                        &[("Mia Nguyen", 27.7), ("Noah Park", 27.6)],
                    ),
                    ballot(
                        GAIL,
                        "L",
                        &[("Mia Nguyen", 27.9), ("Noah Park", 28.0)],
                    ),
                ],
            ),
        ],
    );

    let greenfield_qr = entry(
        3,
        "Greenfield QR",
        "Greenfield",
        ["Quinn Reyes", "Rhea Singh"],
        vec![
            round(
                "Round 1",
                "Gov",
                Some(4),
                vec![
                    ballot(
                        JON,
                        "W",
                        &[("Quinn Reyes", 28.0), ("Rhea Singh", 27.9)],
                    ),
                    ballot(
                        GAIL,
                        "L",
                        &[("Quinn Reyes", 27.8), ("Rhea Singh", 27.7)],
                    ),
                ],
            ),
            round(
                "Round 2",
                "Con",
                Some(1),
                vec![ballot(
                    INGRID,
                    "L",
                    &[("Quinn Reyes", 27.6), ("Rhea Singh", 27.5)],
                )],
            ),
            round(
                "Semis",
                "Opp",
                Some(2),
                vec![
                    ballot(
                        GAIL,
                        "L",
                        &[("Quinn Reyes", 27.4), ("Rhea Singh", 27.3)],
                    ),
                    ballot(
                        JON,
                        "L",
                        &[("Quinn Reyes", 27.5), ("Rhea Singh", 27.6)],
                    ),
                    ballot(
                        HARRIET,
                        "L",
                        &[("Quinn Reyes", 27.7), ("Rhea Singh", 27.8)],
                    ),
                ],
            ),
        ],
    );

    let dover = entry(
        4,
        "Dover ST",
        "Dover",
        ["Sam Tran", "Tess Udo"],
        vec![
            round(
                "Round 1",
                "Opp",
                Some(3),
                vec![
                    ballot(
                        JON,
                        "L",
                        &[("Sam Tran", 27.9), ("Tess Udo", 27.8)],
                    ),
                    ballot(
                        GAIL,
                        "W",
                        &[("Sam Tran", 28.1), ("Tess Udo", 28.2)],
                    ),
                ],
            ),
            round(
                "Round 2",
                "Pro",
                Some(2),
                vec![ballot(
                    HARRIET,
                    "W",
                    &[("Sam Tran", 28.0), ("Tess Udo", 28.1)],
                )],
            ),
            round(
                "Semis",
                "Neg",
                Some(1),
                vec![
                    ballot(
                        INGRID,
                        "L",
                        &[("Sam Tran", 28.2), ("Tess Udo", 28.0)],
                    ),
                    ballot(
                        JON,
                        "L",
                        &[("Sam Tran", 28.3), ("Tess Udo", 28.2)],
                    ),
                    ballot(
                        HARRIET,
                        "W",
                        &[("Sam Tran", 28.9), ("Tess Udo", 29.0)],
                    ),
                ],
            ),
        ],
    );

    let weston = entry(
        5,
        "Weston XY",
        "Weston",
        ["Uma Voss", "Vik Wren"],
        vec![round("Round 1", "Observer", None, vec![])],
    );

    let set = RecordSet {
        tab_tourn_id: 90001,
        tab_event_id: 70001,
        tournament: "Example Invitational".to_string(),
        entries: vec![arcadia, greenfield_mn, greenfield_qr, dover, weston],
    };

    (config, set)
}

fn team_id(competitors: [&str; 2]) -> String {
    entity_id(&competitors)
}

const SCOPE: Scope = Scope {
    circuit_id: 9,
    season_id: 2026,
};

#[test]
fn ingest_builds_results_seeds_and_bids() {
    let mut conn = conn();
    let (config, set) = example_set();

    let summary = ingest::ingest_division(&mut conn, &config, &set).unwrap();
    assert_eq!(summary.entries, 4);
    assert_eq!(summary.entries_skipped, 1);
    assert_eq!(summary.judge_records, 14);

    let results: Vec<(
        String,
        Option<i64>,
        i64,
        i64,
        Option<f64>,
        Option<f64>,
        Option<String>,
        Option<bool>,
    )> = team_results::table
        .select((
            team_results::team_id,
            team_results::prelim_pos,
            team_results::prelim_ballots_won,
            team_results::prelim_ballots_lost,
            team_results::op_wp_m,
            team_results::otr_comp,
            team_results::bid,
            team_results::ghost_bid,
        ))
        .load(&mut conn)
        .unwrap();
    assert_eq!(results.len(), 4);

    let of_team = |competitors: [&str; 2]| {
        let id = team_id(competitors);
        results.iter().find(|row| row.0 == id).unwrap().clone()
    };

    let arcadia = of_team(["Kai Lin", "Lena Ortiz"]);
    assert_eq!(arcadia.1, Some(1));
    assert_eq!((arcadia.2, arcadia.3), (2, 0));
    assert!((arcadia.4.unwrap() - 0.25).abs() < 1e-12);
    assert!((arcadia.5.unwrap() - 0.9625).abs() < 1e-12);
    assert_eq!(arcadia.6.as_deref(), Some("Full"));
    assert_eq!(arcadia.7, Some(false));

    let dover = of_team(["Sam Tran", "Tess Udo"]);
    assert_eq!(dover.1, Some(2));
    assert!((dover.5.unwrap() - 0.52283950617283945).abs() < 1e-9);
    assert_eq!(dover.6.as_deref(), Some("Partial"));

    let greenfield_qr = of_team(["Quinn Reyes", "Rhea Singh"]);
    assert_eq!(greenfield_qr.1, Some(3));
    assert!((greenfield_qr.5.unwrap() - 0.28858024691358025).abs() < 1e-9);
    // Semifinal exit against a same-school opponent: the ghost condition
    // promotes the would-be partial to a full bid.
    assert_eq!(greenfield_qr.6.as_deref(), Some("Full"));
    assert_eq!(greenfield_qr.7, Some(true));

    let greenfield_mn = of_team(["Mia Nguyen", "Noah Park"]);
    assert_eq!(greenfield_mn.1, Some(4));
    assert_eq!(greenfield_mn.5, Some(0.0));
    assert_eq!(greenfield_mn.6.as_deref(), Some("Full"));

    // Split prelims tally as half wins.
    let split_tallies: (f64, f64) = team_results::table
        .filter(team_results::team_id.eq(team_id(["Quinn Reyes", "Rhea Singh"])))
        .select((team_results::prelim_wins, team_results::prelim_losses))
        .first(&mut conn)
        .unwrap();
    assert_eq!(split_tallies, (0.5, 1.5));

    // Elimination names standardized off the division's first elim round.
    let arcadia_rounds: Vec<(String, String)> = rounds::table
        .filter(rounds::team_id.eq(team_id(["Kai Lin", "Lena Ortiz"])))
        .select((rounds::name, rounds::name_std))
        .load(&mut conn)
        .unwrap();
    assert_eq!(arcadia_rounds.len(), 4);
    let std_of = |name: &str| {
        arcadia_rounds
            .iter()
            .find(|(raw, _)| raw == name)
            .map(|(_, std)| std.clone())
            .unwrap()
    };
    assert_eq!(std_of("Semis"), "Semifinals");
    assert_eq!(std_of("Finals"), "Finals");
    assert_eq!(std_of("Round 1"), "Round 1");

    // Speaker aggregates are per competitor, rounded to 2 dp.
    let kai: f64 = speaker_results::table
        .filter(
            speaker_results::competitor_id
                .eq(crate::identity::person_id("Kai Lin")),
        )
        .select(speaker_results::raw_avg_points)
        .first(&mut conn)
        .unwrap();
    assert_eq!(kai, 28.44);

    // Per-division judge speaking aggregates exist for all four judges.
    let judge_rows: i64 =
        judge_results::table.count().get_result(&mut conn).unwrap();
    assert_eq!(judge_rows, 4);

    // A second ingest of the same division is refused.
    assert!(matches!(
        ingest::ingest_division(&mut conn, &config, &set),
        Err(EngineError::AlreadyIngested { tab_event_id: 70001 })
    ));
}

#[test]
fn team_pass_aggregates_and_is_idempotent() {
    let mut conn = conn();
    let (config, set) = example_set();
    ingest::ingest_division(&mut conn, &config, &set).unwrap();

    assert_eq!(teams::rank_teams(&mut conn, SCOPE).unwrap(), 4);

    let load = |conn: &mut SqliteConnection| -> Vec<(String, f64)> {
        team_rankings::table
            .order(team_rankings::team_id.asc())
            .select((team_rankings::team_id, team_rankings::otr))
            .load(conn)
            .unwrap()
    };

    let first = load(&mut conn);
    assert_eq!(first.len(), 4);

    let arcadia = first
        .iter()
        .find(|(id, _)| *id == team_id(["Kai Lin", "Lena Ortiz"]))
        .unwrap();
    assert!(
        (arcadia.1 - scoring::otr_deflator(1) * 0.9625).abs() < 1e-12
    );

    teams::rank_teams(&mut conn, SCOPE).unwrap();
    let second = load(&mut conn);
    // Bit-identical on unchanged inputs.
    assert_eq!(first, second);

    let stamped: chrono::NaiveDateTime = team_rankings::table
        .select(team_rankings::updated_at)
        .first(&mut conn)
        .unwrap();
    assert!(stamped.and_utc().timestamp() > 0);
}

#[test]
fn judge_pass_reads_team_otr_and_writes_back() {
    let mut conn = conn();
    let (config, set) = example_set();
    ingest::ingest_division(&mut conn, &config, &set).unwrap();

    teams::rank_teams(&mut conn, SCOPE).unwrap();
    assert_eq!(judges::rank_judges(&mut conn, SCOPE).unwrap(), 4);

    let ranking = |conn: &mut SqliteConnection, judge: (&str, i64)| -> (
        f64,
        i64,
        i64,
        i64,
        i64,
        f64,
        i64,
    ) {
        judge_rankings::table
            .filter(
                judge_rankings::judge_id
                    .eq(crate::identity::person_id(judge.0)),
            )
            .select((
                judge_rankings::index,
                judge_rankings::rounds,
                judge_rankings::prelims,
                judge_rankings::elims,
                judge_rankings::squirrels,
                judge_rankings::pct_pro,
                judge_rankings::low_point_wins,
            ))
            .first(conn)
            .unwrap()
    };

    // A clean record: the only shrinkage comes from the deflators.
    let ingrid = ranking(&mut conn, INGRID);
    assert_eq!((ingrid.1, ingrid.2, ingrid.3), (4, 2, 2));
    assert_eq!(ingrid.4, 0);
    assert!((ingrid.0 - judges::final_index(10.0, 4)).abs() < 1e-12);
    assert_eq!(ingrid.5, 1.0);

    // Harriet dissented in the semifinal and picked up a squirrel, plus the
    // low-point win she alone saw in that debate.
    let harriet = ranking(&mut conn, HARRIET);
    assert_eq!(harriet.1, 3);
    assert_eq!(harriet.4, 1);
    let raw = judges::raw_index(1, 0, 3);
    assert!((harriet.0 - judges::final_index(raw, 3)).abs() < 1e-12);
    assert_eq!(harriet.6, 1);
    assert!(harriet.0 < ingrid.0);

    // Expected win probabilities are written to both sides of a matchup.
    let finals_wp = |conn: &mut SqliteConnection,
                     competitors: [&str; 2]|
     -> Option<f64> {
        rounds::table
            .filter(rounds::team_id.eq(team_id(competitors)))
            .filter(rounds::name_std.eq("Finals"))
            .select(rounds::expected_win_probability)
            .first(conn)
            .unwrap()
    };
    let arcadia_wp = finals_wp(&mut conn, ["Kai Lin", "Lena Ortiz"]).unwrap();
    let greenfield_wp =
        finals_wp(&mut conn, ["Mia Nguyen", "Noah Park"]).unwrap();
    assert_eq!(arcadia_wp, 0.99);
    assert!((greenfield_wp - 0.01).abs() < 1e-12);
    assert!(((arcadia_wp + greenfield_wp) - 1.0).abs() < 1e-12);

    // No screws in this division: every decided prelim went to the
    // higher-OTR side.
    let screw_factors: Vec<Option<f64>> = crate::schema::judge_records::table
        .filter(crate::schema::judge_records::kind.eq("P"))
        .select(crate::schema::judge_records::screw_factor)
        .load(&mut conn)
        .unwrap();
    assert!(!screw_factors.is_empty());
    assert!(
        screw_factors
            .iter()
            .all(|factor| factor.is_none() || *factor == Some(0.0))
    );

    // Re-running the pass converges on identical output.
    let before = ranking(&mut conn, INGRID);
    judges::rank_judges(&mut conn, SCOPE).unwrap();
    let after = ranking(&mut conn, INGRID);
    assert_eq!(before, after);
}

#[test]
fn speaking_points_average_against_the_scope() {
    let mut conn = conn();
    let (config, set) = example_set();
    ingest::ingest_division(&mut conn, &config, &set).unwrap();
    teams::rank_teams(&mut conn, SCOPE).unwrap();
    judges::rank_judges(&mut conn, SCOPE).unwrap();

    let scope_avg: Option<f64> = round_speaking::table
        .select(diesel::dsl::avg(round_speaking::points))
        .first(&mut conn)
        .unwrap();
    let scope_avg = scope_avg.unwrap();

    let (avg, saa): (Option<f64>, Option<f64>) = judge_rankings::table
        .filter(
            judge_rankings::judge_id
                .eq(crate::identity::person_id(INGRID.0)),
        )
        .select((judge_rankings::avg_spks, judge_rankings::spks_above_avg))
        .first(&mut conn)
        .unwrap();

    let avg = avg.unwrap();
    assert!((saa.unwrap() - (avg - scope_avg)).abs() < 1e-9);
}
