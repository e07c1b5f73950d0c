//! Infra-Core Gate server
//!
//! Entry point for the edge gateway: resolves configuration, seeds the
//! bootstrap routes, and runs the gate until a termination signal drains
//! it. The only command-line surface is the version flag.

use infra_gate::config::settings::{environment_name, load_settings};
use infra_gate::logs::logger::configure_logger;
use infra_gate::server::Gate;

use log::{error, info};

/// One-line description printed under the version banner.
const DESCRIPTION: &str =
    "Self-hosted HTTP edge gateway for the Infra-Core control plane";

#[actix_web::main]
async fn main() {
    if std::env::args()
        .skip(1)
        .any(|arg| arg == "-version" || arg == "--version")
    {
        println!("Infra-Core Gate v{}", env!("CARGO_PKG_VERSION"));
        println!("{DESCRIPTION}");
        return;
    }

    configure_logger();

    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(err) => {
            error!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    info!(
        "starting Infra-Core Gate v{} (environment '{}')",
        env!("CARGO_PKG_VERSION"),
        environment_name()
    );

    let gate = Gate::new(settings);
    gate.seed_bootstrap_routes();

    if let Err(err) = gate.run().await {
        error!("gate terminated: {err}");
        std::process::exit(1);
    }
}
