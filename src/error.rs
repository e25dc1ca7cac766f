use crate::model::edge::EdgeId;
use crate::model::turn::TurnRestrictionId;
use crate::model::vertex::VertexId;

/// errors surfaced by the street-network router and its supporting stores.
///
/// most of these are non-fatal from the caller's perspective: an unsnappable
/// origin, a misconfigured limit, or a dominated state are all situations the
/// router is expected to log and continue from with whatever partial state
/// cloud it has. [`RouterError::InvalidDominanceVariable`] is the one
/// programming-error case that should be treated as unrecoverable.
#[derive(thiserror::Error, Debug)]
pub enum RouterError {
    #[error("vertex {0} not found in graph")]
    VertexNotFound(VertexId),
    #[error("edge {0} not found in graph")]
    EdgeNotFound(EdgeId),
    #[error("turn restriction {0} not found")]
    TurnRestrictionNotFound(TurnRestrictionId),
    #[error("no edge within link radius of ({lat}, {lon}) permits mode {mode:?}")]
    UnsnappablePoint { lat: f64, lon: f64, mode: crate::model::mode::StreetMode },
    #[error("origin is not set; call set_origin before route()")]
    OriginNotSet,
    #[error("dominance variable {0:?} is not a valid routing variable for this operation")]
    InvalidDominanceVariable(crate::model::dominance::DominanceVariable),
    #[error("failure reading graph data from CSV: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },
    #[error("failure reading graph data from file: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
    #[error("internal error: {0}")]
    InternalError(String),
}
