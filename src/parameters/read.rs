use super::cast::cast_parameter_value;
use super::extract::get_parameter_value;
use super::value::{ParamValue, Parameters};
use super::ParameterError;
use crate::error::{ErroneousParameters, FieldError, SpecError};
use crate::router::{Operation, PathParams, Router};
use crate::server::ApiRequest;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Why a request's parameters could not be read.
#[derive(Debug, Error)]
pub enum ReadParametersError {
    /// The document or its wiring is broken; fatal for this request
    #[error(transparent)]
    Spec(#[from] SpecError),
    /// One or more fields failed; every failure is listed
    #[error(transparent)]
    Erroneous(#[from] ErroneousParameters),
}

/// Run extraction, defaults, casting and validation for every declared
/// parameter of `operation`, in declaration order.
///
/// Field-level failures are collected rather than returned one at a time;
/// if any occurred, the result is [`ReadParametersError::Erroneous`] carrying
/// both the failures and the parameters that did decode. Document-level
/// failures abort immediately.
pub fn read_parameters(
    router: &Router,
    operation: &Operation,
    request: &ApiRequest,
    path_params: &PathParams,
) -> Result<Parameters, ReadParametersError> {
    let mut params = Parameters::new();
    let mut errors: BTreeMap<String, FieldError> = BTreeMap::new();

    for parameter in operation.parameters() {
        let name = parameter.name();
        let outcome = get_parameter_value(operation, request, path_params, parameter)
            .and_then(|raw| match raw {
                Some(raw) => {
                    cast_parameter_value(router, parameter.declaration(), name, raw).map(Some)
                }
                None => Ok(None),
            });

        match outcome {
            Ok(Some(value)) => params.insert(name, value),
            Ok(None) => {
                if let Some(default) = parameter.default_value() {
                    params.insert(name, ParamValue::from_json(default));
                } else if parameter.required() {
                    errors.insert(
                        name.to_string(),
                        FieldError::Missing {
                            name: name.to_string(),
                        },
                    );
                }
            }
            Err(ParameterError::Field(err)) => {
                debug!(
                    operation_id = %operation.id(),
                    parameter = %name,
                    location = parameter.location().as_str(),
                    error = %err,
                    "Parameter rejected"
                );
                errors.insert(name.to_string(), err);
            }
            Err(ParameterError::Spec(err)) => return Err(err.into()),
        }
    }

    if errors.is_empty() {
        Ok(params)
    } else {
        Err(ErroneousParameters {
            errors,
            parameters: params,
        }
        .into())
    }
}
