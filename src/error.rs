use std::path::PathBuf;

use snafu::Snafu;

/// Failures that abort a whole batch operation (an ingest run or an
/// aggregation pass), as opposed to [`EntryError`]s which only abort a
/// single entry.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum EngineError {
    #[snafu(context(false))]
    #[snafu(display("database error: {source}"))]
    Db { source: diesel::result::Error },

    #[snafu(display("failed to read {}", path.display()))]
    ReadInput {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to decode record set {}", path.display()))]
    DecodeRecordSet {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to read manifest {}", path.display()))]
    Manifest { source: csv::Error, path: PathBuf },

    #[snafu(display(
        "division with tab event id {tab_event_id} has already been ingested"
    ))]
    AlreadyIngested { tab_event_id: i64 },

    #[snafu(display(
        "first elimination round {name:?} is not on the bracket ladder"
    ))]
    UnknownBracketRound { name: String },
}

/// Failures scoped to one entry. These abort the entry being processed and
/// are logged; sibling entries in the same division continue.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum EntryError {
    #[snafu(display("could not standardize side {side:?}"))]
    UnrecognizedSide { side: String },

    #[snafu(display("unrecognized ballot vote {vote:?}"))]
    UnrecognizedVote { vote: String },

    #[snafu(display(
        "round {name:?} looks like a breakout division round"
    ))]
    BreakoutRound { name: String },

    #[snafu(display(
        "elimination round {step} steps after {first:?} falls off the \
         bracket ladder"
    ))]
    LadderUnderflow { first: String, step: usize },

    #[snafu(display(
        "entry has elimination rounds but the division has no first \
         elimination round configured"
    ))]
    UnconfiguredBracket,
}
