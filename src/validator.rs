use crate::error::{MissingHandler, RouterValidationError};
use crate::handlers::HandlerRegistry;
use crate::router::Router;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{error, info};

/// One problem found while validating a router, printable for operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub location: String,
    pub kind: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        location: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ValidationIssue {
            location: location.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// One `missing_handler` issue per operation of a failed validation
#[must_use]
pub fn issues(err: &RouterValidationError) -> Vec<ValidationIssue> {
    err.errors
        .iter()
        .map(|(id, missing)| ValidationIssue::new(id, "missing_handler", missing.to_string()))
        .collect()
}

/// Check that every operation of the document has a handler.
///
/// Operation ids are collected across all paths first, so an id declared
/// twice is checked once. Every missing handler is reported in a single
/// error, sorted by operation id.
pub fn validate_router(
    router: &Router,
    handlers: &HandlerRegistry,
) -> Result<(), RouterValidationError> {
    let operation_ids: BTreeSet<&str> = router.operations().map(|op| op.id()).collect();
    let errors: BTreeMap<String, MissingHandler> = operation_ids
        .iter()
        .filter_map(|id| {
            handlers
                .get_handler(id)
                .err()
                .map(|err| ((*id).to_string(), err))
        })
        .collect();

    if errors.is_empty() {
        info!(
            operations_count = operation_ids.len(),
            total_handlers = handlers.len(),
            "Router validation passed"
        );
        Ok(())
    } else {
        let err = RouterValidationError { errors };
        error!(
            missing_count = err.errors.len(),
            missing = ?err.errors.keys().collect::<Vec<_>>(),
            "Router validation failed"
        );
        Err(err)
    }
}

pub fn print_issues(issues: &[ValidationIssue]) {
    eprintln!(
        "\n❌ Router validation failed. {} issue(s) found:\n",
        issues.len()
    );
    for issue in issues {
        eprintln!("[{}] {}: {}", issue.kind, issue.location, issue.message);
    }
    eprintln!("\nRegister a handler for each operation before serving requests.\n");
}
