use std::path::PathBuf;

use clap::{Parser, Subcommand};
use diesel::{Connection, SqliteConnection};
use diesel_migrations::MigrationHarness;
use podium::{
    MIGRATIONS,
    config::EngineConfig,
    ingest,
    rankings::{Scope, judges::rank_judges, teams::rank_teams},
};

#[derive(Parser)]
#[clap(name = "podium", about = "Cross-tournament debate rankings engine")]
struct Cli {
    /// TOML config file.
    #[clap(long, short)]
    config: Option<PathBuf>,
    /// Overrides the configured database URL.
    #[clap(long)]
    database_url: Option<String>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest every division listed in a manifest CSV.
    Ingest {
        manifest: PathBuf,
        /// Recompute team and judge rankings for each ingested division's
        /// scopes afterwards.
        #[clap(long, action)]
        update_rankings: bool,
    },
    /// Recompute team OTR aggregates for one (circuit, season) scope.
    RankTeams {
        #[clap(long)]
        circuit: i64,
        #[clap(long)]
        season: i64,
    },
    /// Recompute judge indices for one (circuit, season) scope. The scope's
    /// team aggregates must be current; run `rank-teams` first.
    RankJudges {
        #[clap(long)]
        circuit: i64,
        #[clap(long)]
        season: i64,
    },
}

fn main() {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();

    let config = EngineConfig::load(cli.config.as_deref());
    let database_url = cli.database_url.unwrap_or(config.database_url);

    let mut conn = SqliteConnection::establish(&database_url)
        .unwrap_or_else(|e| panic!("could not open {database_url}: {e}"));
    conn.run_pending_migrations(MIGRATIONS).unwrap();

    match cli.command {
        Command::Ingest {
            manifest,
            update_rankings,
        } => {
            let rows = ingest::read_manifest(&manifest).unwrap();

            for row in rows {
                let config = row.config();
                let set = match ingest::read_record_set(
                    &manifest.with_file_name(&row.records),
                ) {
                    Ok(set) => set,
                    Err(error) => {
                        tracing::error!(
                            nickname = %row.nickname,
                            %error,
                            "could not load record set; skipping division"
                        );
                        continue;
                    }
                };

                match ingest::ingest_division(&mut conn, &config, &set) {
                    Ok(summary) => {
                        tracing::info!(
                            nickname = %row.nickname,
                            entries = summary.entries,
                            skipped = summary.entries_skipped,
                            "ingested"
                        );
                    }
                    Err(error) => {
                        tracing::error!(
                            nickname = %row.nickname,
                            %error,
                            "ingest failed; skipping division"
                        );
                        continue;
                    }
                }

                if update_rankings {
                    // Team aggregates feed the judge pass; order matters.
                    for circuit_id in &config.circuit_ids {
                        let scope = Scope {
                            circuit_id: *circuit_id,
                            season_id: config.season_id,
                        };
                        if let Err(error) = rank_teams(&mut conn, scope) {
                            tracing::error!(?scope, %error, "team pass failed");
                            continue;
                        }
                        if let Err(error) = rank_judges(&mut conn, scope) {
                            tracing::error!(?scope, %error, "judge pass failed");
                        }
                    }
                }
            }
        }
        Command::RankTeams { circuit, season } => {
            rank_teams(
                &mut conn,
                Scope {
                    circuit_id: circuit,
                    season_id: season,
                },
            )
            .unwrap();
        }
        Command::RankJudges { circuit, season } => {
            rank_judges(
                &mut conn,
                Scope {
                    circuit_id: circuit,
                    season_id: season,
                },
            )
            .unwrap();
        }
    }
}
