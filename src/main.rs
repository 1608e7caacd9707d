//! Route inspection CLI.
//!
//! Loads a routing configuration and answers questions about its explicitly
//! configured routes: which route a token hits, what URL a route generates.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use dispatch_router::config::load_config;
use dispatch_router::observability::logging::init_logging;
use dispatch_router::routing::{ControllerRegistry, Route, Router};
use dispatch_router::RequestContext;

#[derive(Parser)]
#[command(name = "dispatch-router")]
#[command(about = "Inspect and exercise a routing configuration", long_about = None)]
struct Cli {
    /// Path to the routing configuration file.
    #[arg(short, long, default_value = "routing.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration file
    Check,
    /// List routes in match order
    Routes,
    /// Show which route a token matches and the extracted values
    Match {
        /// Route token, e.g. /blog/hello-world
        token: String,
    },
    /// Generate the URL of a named route
    Url {
        /// Route name
        name: String,
        /// Parameters as key=value
        params: Vec<String>,
        /// Front script path used to derive the base path
        #[arg(long, default_value = "")]
        script_name: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_logging(&config.observability);

    let router = Router::from_config(
        &config.routing,
        &config.root,
        Arc::new(ControllerRegistry::new()),
    )?;

    match cli.command {
        Commands::Check => {
            println!(
                "{}: OK ({} routes)",
                cli.config.display(),
                router.routes().len()
            );
        }
        Commands::Routes => {
            for route in router.routes().sort_routes().iter() {
                print_route(route);
            }
        }
        Commands::Match { token } => {
            let token = RequestContext::new()
                .with_query(dispatch_router::http::ROUTE_PARAM, token)
                .route_token();
            let (route, values) = router.match_route(&token)?;
            print_route(route);
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
        Commands::Url {
            name,
            params,
            script_name,
        } => {
            let params = params
                .iter()
                .map(|pair| {
                    pair.split_once('=')
                        .ok_or_else(|| format!("expected key=value, got '{}'", pair))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let ctx = RequestContext::new().with_script_name(script_name);
            println!("{}", router.generate_url(&name, params, &ctx)?);
        }
    }

    Ok(())
}

fn print_route(route: &Route) {
    println!(
        "{:>4}  {:<24} {:<40} {}::{}",
        route.priority(),
        route.name(),
        route.rule(),
        route.controller(),
        route.action()
    );
}
