//! # Parameters Module
//!
//! Turns an incoming request into the typed parameter set of the matched
//! operation.
//!
//! ## Pipeline
//!
//! For each declared parameter, in declaration order:
//!
//! 1. **Extraction** ([`get_parameter_value`]) by `in`: `query` and `formData`
//!    (with `collectionFormat: multi` reading every occurrence), `path` from
//!    the matcher's captures, `header` through [`header_meta_key`](crate::server::header_meta_key),
//!    `body` through [`read_body`]. `formData` files bypass casting.
//! 2. **Missing values**: a declared `default` is used as-is; otherwise a
//!    `required` parameter records [`FieldError::Missing`](crate::error::FieldError::Missing);
//!    otherwise the parameter is omitted.
//! 3. **Casting** ([`cast_parameter_value`]): collection splitting, primitive
//!    casts by `type`/`format`, body schema validation with discriminator
//!    support, and the validation keyword check.
//! 4. **Aggregation** ([`read_parameters`]): field failures are collected per
//!    parameter name and returned together as
//!    [`ErroneousParameters`](crate::error::ErroneousParameters);
//!    document failures ([`SpecError`]) abort at once.
//!
//! Decoded parameters are keyed by the snake_case form of their declared name,
//! so `petId` is read as `params.get_i64("pet_id")`.

mod body;
mod cast;
mod extract;
mod read;
mod value;

use crate::error::{FieldError, SpecError};
use thiserror::Error;

pub use body::read_body;
pub use cast::{cast_parameter_value, cast_primitive_value, VALIDATION_KEYWORDS};
pub use extract::get_parameter_value;
pub use read::{read_parameters, ReadParametersError};
pub use value::{ParamValue, Parameters, RawValue};

/// Failure while extracting or casting a single parameter.
#[derive(Debug, Error)]
pub enum ParameterError {
    /// Recoverable, recorded against the parameter
    #[error(transparent)]
    Field(#[from] FieldError),
    /// The document is at fault; propagates immediately
    #[error(transparent)]
    Spec(#[from] SpecError),
}
