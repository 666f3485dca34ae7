//! Scope-level aggregation passes.
//!
//! The two passes have a strict order: every team OTR aggregate for a scope
//! must be recomputed before the judge index pass reads OTR values for that
//! scope. The read side goes through [`TeamOtrReader`] so the dependency is
//! a visible query boundary instead of an accident of job scheduling.

use std::collections::HashMap;

use diesel::{SqliteConnection, prelude::*};

use crate::{error::EngineError, schema::team_rankings};

pub mod judges;
pub mod teams;

/// A (circuit, season) aggregation scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub circuit_id: i64,
    pub season_id: i64,
}

/// Read-only, memoized access to the already-aggregated team OTR values of
/// one scope.
pub struct TeamOtrReader {
    scope: Scope,
    cache: HashMap<String, Option<f64>>,
}

impl TeamOtrReader {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            cache: HashMap::new(),
        }
    }

    pub fn otr(
        &mut self,
        team_id: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Option<f64>, EngineError> {
        if let Some(cached) = self.cache.get(team_id) {
            return Ok(*cached);
        }

        let otr = team_rankings::table
            .filter(team_rankings::team_id.eq(team_id))
            .filter(team_rankings::circuit_id.eq(self.scope.circuit_id))
            .filter(team_rankings::season_id.eq(self.scope.season_id))
            .select(team_rankings::otr)
            .first::<f64>(conn)
            .optional()?;

        self.cache.insert(team_id.to_string(), otr);
        Ok(otr)
    }
}
