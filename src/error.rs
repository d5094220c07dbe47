use thiserror::Error;

/// Errors raised before any trial runs. Once the trial loop starts the
/// engine cannot fail; cancellation surfaces as a warning on the report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("no schools match class {class} region {region} season {season}")]
    EmptyRegion { class: u16, region: u16, season: u16 },

    #[error("completed region series between {a} and {b} has irreconcilable sides")]
    InconsistentPair { a: String, b: String },

    #[error("region game pairs {school} with {opponent}, which is not in the region")]
    MissingOpponent { school: String, opponent: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
