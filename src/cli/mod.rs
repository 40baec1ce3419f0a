//! # CLI Module
//!
//! Command-line tooling around the router: check that a document compiles,
//! list the URL table it produces and generate handler stubs.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Load and compile a document. Prints the path and operation counts, or
//! fails with the integrity error (unresolvable `$ref`, missing
//! `operationId`, malformed parameter, ...):
//!
//! ```bash
//! specrouter check --spec swagger.yaml
//! ```
//!
//! With `--handler list_pets,get_pet` it also verifies that every operation
//! would find one of the named handlers, listing the ones that would not.
//!
//! ### `routes`
//!
//! Print one line per path as `METHODS pattern name`:
//!
//! ```bash
//! specrouter routes --spec swagger.yaml --optional-trailing-slash --name-template 'api:{name}'
//! ```
//!
//! Options:
//! - `--optional-trailing-slash` - Relax each pattern so one trailing `/` is accepted
//! - `--name-template <T>` - Route name template; must contain `{name}`
//!
//! Defaults come from [`RouterConfig::from_env`](crate::config::RouterConfig::from_env).
//!
//! ### `stubs`
//!
//! Generate handler stubs for every operation:
//!
//! ```bash
//! specrouter stubs --spec swagger.yaml --output src/handlers.rs
//! ```
//!
//! Without `--output` the module is printed to stdout.
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use specrouter::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! run_cli(&cli)?;
//! ```

mod commands;

pub use commands::{run_cli, run_cli_with_output, Cli, Commands};
