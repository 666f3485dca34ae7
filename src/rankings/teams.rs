//! Season/scope OTR aggregate pass.

use diesel::{SqliteConnection, dsl::now, prelude::*};
use itertools::Itertools;
use uuid::Uuid;

use crate::{
    error::EngineError,
    rankings::Scope,
    schema::{division_circuits, divisions, team_rankings, team_results},
    scoring,
};

/// Recomputes the OTR aggregate for every team with results in the scope.
/// A pure function of the persisted per-tournament composites, so re-running
/// it is always safe; each team is upserted independently and a failed
/// write only leaves that team's row stale.
#[tracing::instrument(skip(conn))]
pub fn rank_teams(
    conn: &mut SqliteConnection,
    scope: Scope,
) -> Result<usize, EngineError> {
    let composites: Vec<(String, Option<f64>)> = team_results::table
        .inner_join(
            divisions::table.on(team_results::division_id.eq(divisions::id)),
        )
        .inner_join(
            division_circuits::table
                .on(division_circuits::division_id.eq(divisions::id)),
        )
        .filter(division_circuits::circuit_id.eq(scope.circuit_id))
        .filter(divisions::season_id.eq(scope.season_id))
        .filter(team_results::otr_comp.is_not_null())
        .select((team_results::team_id, team_results::otr_comp))
        .load(conn)?;

    let mut written = 0usize;
    for (team_id, composites) in composites
        .into_iter()
        .filter_map(|(team_id, comp)| comp.map(|comp| (team_id, comp)))
        .into_group_map()
        .into_iter()
        .sorted_by(|a, b| a.0.cmp(&b.0))
    {
        let Some(otr) = scoring::season_otr(&composites) else {
            tracing::info!(%team_id, "no ranked composites in scope; skipping");
            continue;
        };

        let write = diesel::insert_into(team_rankings::table)
            .values((
                team_rankings::id.eq(Uuid::now_v7().to_string()),
                team_rankings::team_id.eq(&team_id),
                team_rankings::circuit_id.eq(scope.circuit_id),
                team_rankings::season_id.eq(scope.season_id),
                team_rankings::otr.eq(otr),
                team_rankings::updated_at.eq(now),
            ))
            .on_conflict((
                team_rankings::team_id,
                team_rankings::circuit_id,
                team_rankings::season_id,
            ))
            .do_update()
            .set((
                team_rankings::otr.eq(otr),
                team_rankings::updated_at.eq(now),
            ))
            .execute(conn);

        match write {
            Ok(_) => written += 1,
            Err(error) => {
                // The upsert is idempotent, so a re-run picks this team up
                // again.
                tracing::error!(
                    %team_id,
                    circuit_id = scope.circuit_id,
                    season_id = scope.season_id,
                    %error,
                    "failed to upsert team ranking"
                );
            }
        }
    }

    tracing::info!(teams = written, "team OTR aggregates recomputed");
    Ok(written)
}
