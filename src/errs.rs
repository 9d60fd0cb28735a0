use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;

/// The error-kind taxonomy for the simulation core. Parsing and I/O
/// failures are meant to be fatal (propagated with `anyhow::Context` at
/// the CLI boundary); the rest are handled locally by callers that know
/// how to recover (skip a position, try the next candidate, stop early).
#[derive(Error, Debug)]
pub enum SimError {
    #[error("position {0} is not inside any ORF")]
    OutsideOrf(usize),

    #[error("sticky-end window at {0}..{1} is out of bounds")]
    OutOfBounds(usize, usize),

    #[error("no synonymous alternatives found for window at {0}")]
    NoAlternatives(usize),

    #[error("could not find a site to remove after scanning the whole genome")]
    NoSite,

    #[error("could not find a silent slot to add a site after scanning the whole genome")]
    NoSlot,

    #[error("parse error at {where_}: {reason}")]
    ParseError { where_: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
