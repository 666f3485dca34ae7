//! Generates a synthetic division (manifest + record set) for local runs.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use podium::ingest::{
    ManifestRow, RawBallot, RawEntry, RawRound, RawSpeaking, RecordSet,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

#[derive(Parser)]
struct Generate {
    #[clap(long, default_value = "testdata")]
    out_dir: PathBuf,
    /// Must be even.
    #[clap(long, default_value_t = 16)]
    teams: usize,
    #[clap(long, default_value_t = 5)]
    prelims: usize,
    #[clap(long, default_value_t = 42)]
    seed: u64,
}

const FIRST_NAMES: [&str; 8] = [
    "Avery", "Blake", "Carmen", "Devi", "Emerson", "Farah", "Grey", "Hana",
];
const LAST_NAMES: [&str; 8] = [
    "Okafor", "Petrov", "Quan", "Ramos", "Sato", "Torres", "Ueda", "Vance",
];

struct Debate {
    pro: usize,
    con: usize,
    // (judge index, did pro win this ballot)
    ballots: Vec<(usize, bool)>,
}

fn round_robin_pairs(n: usize, round: usize) -> Vec<(usize, usize)> {
    let mut order: Vec<usize> = (0..n).collect();
    let rest = &mut order[1..];
    rest.rotate_right(round % rest.len());

    (0..n / 2).map(|k| (order[k], order[n - 1 - k])).collect()
}

fn main() {
    let args = Generate::parse();
    assert!(args.teams % 2 == 0, "--teams must be even");
    assert!(
        (8..=64).contains(&args.teams),
        "--teams must be between 8 and 64"
    );

    let mut rng = StdRng::seed_from_u64(args.seed);

    // Name pairs are distinct for up to 64 teams; identities derive from
    // competitor names, so two teams must never share both.
    let competitors: Vec<Vec<String>> = (0..args.teams)
        .map(|i| {
            let shift = i / FIRST_NAMES.len();
            vec![
                format!(
                    "{} {}",
                    FIRST_NAMES[i % FIRST_NAMES.len()],
                    LAST_NAMES[(i * 3 + shift) % LAST_NAMES.len()]
                ),
                format!(
                    "{} {}",
                    FIRST_NAMES[(i + 5) % FIRST_NAMES.len()],
                    LAST_NAMES[(i * 3 + 1 + shift) % LAST_NAMES.len()]
                ),
            ]
        })
        .collect();

    let judge_names: Vec<String> = (0..args.teams / 2 + 3)
        .map(|i| {
            format!(
                "{} {}",
                FIRST_NAMES[(i + 2) % FIRST_NAMES.len()],
                LAST_NAMES[(i + 4 + i / FIRST_NAMES.len()) % LAST_NAMES.len()]
            )
        })
        .collect();

    // Lower-indexed teams are stronger; each ballot leans their way.
    let win_prob = |a: usize, b: usize, rng: &mut StdRng| -> bool {
        let strength_gap = (b as f64 - a as f64) / args.teams as f64;
        rng.random_bool((0.5 + 0.45 * strength_gap).clamp(0.05, 0.95))
    };

    let mut debates: Vec<(String, Debate)> = Vec::new();

    for round in 0..args.prelims {
        for (a, b) in round_robin_pairs(args.teams, round) {
            let judge = rng.random_range(0..judge_names.len());
            let pro_won = win_prob(a, b, &mut rng);
            debates.push((
                format!("Round {}", round + 1),
                Debate {
                    pro: a,
                    con: b,
                    ballots: vec![(judge, pro_won)],
                },
            ));
        }
    }

    // Single-elim bracket over the top eight seeds, panels of three.
    let mut bracket: Vec<usize> = (0..8).collect();
    for name in ["Quarters", "Semis", "Finals"] {
        let mut next = Vec::new();
        let half = bracket.len() / 2;
        for k in 0..half {
            let (a, b) = (bracket[k], bracket[bracket.len() - 1 - k]);
            let panel_base = rng.random_range(0..judge_names.len());
            let ballots: Vec<(usize, bool)> = (0..3)
                .map(|p| {
                    (
                        (panel_base + p) % judge_names.len(),
                        win_prob(a, b, &mut rng),
                    )
                })
                .collect();
            let pro_votes =
                ballots.iter().filter(|(_, pro_won)| *pro_won).count();
            next.push(if pro_votes >= 2 { a } else { b });
            debates.push((
                name.to_string(),
                Debate {
                    pro: a,
                    con: b,
                    ballots,
                },
            ));
        }
        bracket = next;
    }

    let entries: Vec<RawEntry> = (0..args.teams)
        .map(|team| {
            let rounds = debates
                .iter()
                .filter(|(_, debate)| debate.pro == team || debate.con == team)
                .map(|(name, debate)| {
                    let on_pro = debate.pro == team;
                    let opponent =
                        if on_pro { debate.con } else { debate.pro };

                    let ballots = debate
                        .ballots
                        .iter()
                        .map(|(judge, pro_won)| RawBallot {
                            judge_name: judge_names[*judge].clone(),
                            tab_judge_id: 500 + *judge as i64,
                            vote: if *pro_won == on_pro { "W" } else { "L" }
                                .to_string(),
                            speaking: competitors[team]
                                .iter()
                                .map(|competitor| RawSpeaking {
                                    competitor: competitor.clone(),
                                    points: (rng.random_range(26.0..30.0_f64)
                                        * 10.0)
                                        .round()
                                        / 10.0,
                                })
                                .collect(),
                        })
                        .collect();

                    RawRound {
                        name: name.clone(),
                        side: if on_pro { "Aff" } else { "Neg" }.to_string(),
                        opponent_tab_entry_id: Some(1000 + opponent as i64),
                        ballots,
                    }
                })
                .collect();

            RawEntry {
                tab_entry_id: 1000 + team as i64,
                code: format!("School {team} {}", ["AB", "CD", "EF"][team % 3]),
                school: format!("School {team}"),
                location: Some("Example City, ST".to_string()),
                competitors: competitors[team].clone(),
                rounds,
            }
        })
        .collect();

    let set = RecordSet {
        tab_tourn_id: 90001,
        tab_event_id: 70001,
        tournament: "Example Invitational".to_string(),
        entries,
    };

    fs::create_dir_all(&args.out_dir).unwrap();
    let records_path = args.out_dir.join("example-invitational.json");
    fs::write(&records_path, serde_json::to_string_pretty(&set).unwrap())
        .unwrap();

    let manifest_path = args.out_dir.join("manifest.csv");
    let mut writer = csv::Writer::from_path(&manifest_path).unwrap();
    writer
        .serialize(ManifestRow {
            nickname: "Example".to_string(),
            tab_tourn_id: set.tab_tourn_id,
            tab_event_id: set.tab_event_id,
            event: "PublicForum".to_string(),
            classification: "Varsity".to_string(),
            division_name: "Open PF".to_string(),
            season_id: 2026,
            circuits: "1".to_string(),
            first_elim_round: Some("Quarterfinals".to_string()),
            full_bid_round: Some("Semifinals".to_string()),
            boost: 1.25,
            records: "example-invitational.json".to_string(),
        })
        .unwrap();
    writer.flush().unwrap();

    println!(
        "wrote {} and {}",
        manifest_path.display(),
        records_path.display()
    );
}
