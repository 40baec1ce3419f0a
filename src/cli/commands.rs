use crate::config::RouterConfig;
use crate::generator::{generate_handler_stubs, write_handler_stubs};
use crate::handlers::HandlerRegistry;
use crate::router::Router;
use crate::validator::{issues, print_issues, validate_router};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Command-line interface for specrouter
///
/// Inspects Swagger 2.0 documents the way the router compiles them and
/// generates handler stubs.
#[derive(Debug, Parser)]
#[command(name = "specrouter")]
#[command(about = "Swagger 2.0 request router tooling", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load and compile a document, reporting the route count
    Check {
        /// Path to the Swagger specification file (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Handler names the service registers; every operation must be covered
        #[arg(long = "handler", value_delimiter = ',')]
        handlers: Vec<String>,
    },
    /// Print the URL table as `METHODS pattern name`, one path per line
    Routes {
        /// Path to the Swagger specification file (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Accept every path with or without one trailing slash
        #[arg(long, default_value_t = false)]
        optional_trailing_slash: bool,

        /// Route name template; `{name}` is replaced by the path name
        #[arg(long)]
        name_template: Option<String>,
    },
    /// Generate a Rust module with one handler stub per operation
    Stubs {
        /// Path to the Swagger specification file (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Write the module here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run a parsed command, printing to stdout.
pub fn run_cli(cli: &Cli) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_cli_with_output(cli, &mut out)
}

/// Run a parsed command, printing to `out`.
pub fn run_cli_with_output(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Check { spec, handlers } => {
            let router = load_router(spec)?;
            let operations_count = router.operations().count();
            writeln!(
                out,
                "{}: {} paths, {} operations",
                spec.display(),
                router.get_paths().len(),
                operations_count
            )?;
            if !handlers.is_empty() {
                check_handlers(&router, handlers)?;
                writeln!(out, "All operations have handlers")?;
            }
            Ok(())
        }
        Commands::Routes {
            spec,
            optional_trailing_slash,
            name_template,
        } => {
            let router = load_router(spec)?;
            let mut config = RouterConfig::from_env();
            if *optional_trailing_slash {
                config.optional_trailing_slash = true;
            }
            if let Some(template) = name_template {
                anyhow::ensure!(
                    template.contains("{name}"),
                    "name template `{template}` must contain {{name}}"
                );
                config.route_name_template = template.clone();
            }
            let options = config.url_options();
            for path in router.get_paths() {
                let methods = path
                    .allowed_methods()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                writeln!(
                    out,
                    "{} {} {}",
                    methods,
                    options.adjust_pattern(path.pattern()),
                    options.route_name(path.name())
                )?;
            }
            if let Some(root_name) = &options.root_view_name {
                writeln!(out, "- ^$ {}", options.route_name(root_name))?;
            }
            Ok(())
        }
        Commands::Stubs { spec, output } => {
            let router = load_router(spec)?;
            match output {
                Some(path) => {
                    write_handler_stubs(&router, path)?;
                    writeln!(out, "Handler stubs written to {}", path.display())?;
                }
                None => out.write_all(generate_handler_stubs(&router)?.as_bytes())?,
            }
            Ok(())
        }
    }
}

/// Validate the router against a registry holding only the given names.
fn check_handlers(router: &Router, names: &[String]) -> anyhow::Result<()> {
    let registry = names
        .iter()
        .fold(HandlerRegistry::builder(), |builder, name| {
            builder.add(name.clone(), |ctx, _params| {
                anyhow::bail!("{} is only a name", ctx.operation.id())
            })
        })
        .build();
    if let Err(err) = validate_router(router, &registry) {
        print_issues(&issues(&err));
        return Err(err.into());
    }
    Ok(())
}

fn load_router(spec: &Path) -> anyhow::Result<Router> {
    match Router::from_file(spec) {
        Ok(router) => {
            info!(spec = %spec.display(), "Specification loaded");
            Ok(router)
        }
        Err(err) => {
            error!(spec = %spec.display(), error = %err, "Failed to load specification - CRITICAL");
            Err(err).with_context(|| format!("invalid specification {}", spec.display()))
        }
    }
}
