//! Errors that propagate to the coordinator boundary.
//!
//! Per §7 of the design: field-level outcomes never raise here — they're
//! represented as [`crate::outcome::FieldOutcome`] and isolated inside the
//! Resource Builder. Only structural failures reach this type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no message template for type '{0}'")]
    UnknownMessageType(String),

    #[error("unresolved reference to resource type '{0}'")]
    UnresolvedReference(String),

    #[error(transparent)]
    Template(#[from] fhirloom_templates::Error),

    #[error(transparent)]
    Hl7(#[from] fhirloom_hl7::Error),

    #[error(transparent)]
    Bundle(#[from] fhirloom_models::Error),
}
