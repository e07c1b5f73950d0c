//! Gate lifecycle: listener assembly, state machine, graceful drain.
//!
//! A [`Gate`] owns the shared state of the edge gateway (route table,
//! metrics registry, ACME collaborator) and drives both HTTP listeners
//! through their lifecycle:
//!
//! ```text
//! created → starting → serving → draining → stopped
//! ```
//!
//! `stopped` is terminal; a gate is not restartable within the same
//! process. A bind failure on either listener skips straight from
//! `starting` to `stopped` with a surfaced error. SIGINT and SIGTERM both
//! begin a drain, bounded by a 30 second deadline after which in-flight
//! requests are abandoned and the shutdown-timeout error is surfaced.

use crate::models::error::GateError;
use crate::models::route::RouteDefinition;
use crate::models::settings::Settings;
use crate::routes::{management, proxy};
use crate::services::acme::{ChallengeLookup, DirChallengeStore};
use crate::services::http::RequestDispatcher;
use crate::services::metrics::MetricsRegistry;
use crate::services::route_table::RouteTable;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::{error, info, warn};
use std::sync::{Arc, Mutex};
use tokio::time::{timeout, Duration};

/// How long a drain may take before in-flight requests are abandoned.
const DRAIN_DEADLINE: Duration = Duration::from_secs(30);

/// Identifier of the bootstrap route to the console service.
const CONSOLE_ROUTE_ID: &str = "console";

/// Access-log line for both listeners.
const ACCESS_LOG_FORMAT: &str = r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T"#;

/// Lifecycle states of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Constructed, listeners not yet bound.
    Created,
    /// Binding listeners.
    Starting,
    /// Both listeners accepting traffic.
    Serving,
    /// Listeners closed to new connections, in-flight requests finishing.
    Draining,
    /// Terminal. Reached through drain completion or a fatal startup error.
    Stopped,
}

/// Shared, observable view of the gate's lifecycle state.
///
/// `Gate::run` consumes the gate, so observers (logging, tests, the
/// surrounding supervisor) hold one of these instead.
#[derive(Clone)]
pub struct GateStateHandle(Arc<Mutex<GateState>>);

impl GateStateHandle {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(GateState::Created)))
    }

    /// Current lifecycle state.
    pub fn get(&self) -> GateState {
        *self.0.lock().unwrap()
    }

    fn set(&self, state: GateState) {
        *self.0.lock().unwrap() = state;
    }
}

/// The edge gateway: both listeners plus the state they share.
///
/// # Examples
///
/// ```rust,no_run
/// use infra_gate::config::settings::load_settings;
/// use infra_gate::server::Gate;
///
/// #[actix_web::main]
/// async fn main() {
///     let settings = load_settings().expect("configuration");
///     let gate = Gate::new(settings);
///     gate.seed_bootstrap_routes();
///     if let Err(err) = gate.run().await {
///         eprintln!("gate terminated: {err}");
///         std::process::exit(1);
///     }
/// }
/// ```
pub struct Gate {
    settings: Settings,
    table: Arc<RouteTable>,
    metrics: Arc<MetricsRegistry>,
    challenges: Option<Arc<dyn ChallengeLookup>>,
    state: GateStateHandle,
}

impl Gate {
    /// Builds a gate from validated settings. No listener is bound yet;
    /// the gate starts in the `created` state.
    pub fn new(settings: Settings) -> Self {
        let metrics = Arc::new(MetricsRegistry::new());
        let table = Arc::new(RouteTable::new(Arc::clone(&metrics)));

        let challenges: Option<Arc<dyn ChallengeLookup>> = if settings.acme_enabled() {
            info!(
                "ACME challenge interception enabled, cache dir {}",
                settings.gate.acme.cache_dir
            );
            Some(Arc::new(DirChallengeStore::new(
                settings.gate.acme.cache_dir.clone(),
            )))
        } else {
            None
        };

        Self {
            settings,
            table,
            metrics,
            challenges,
            state: GateStateHandle::new(),
        }
    }

    /// Shared handle to the live routing table.
    pub fn route_table(&self) -> Arc<RouteTable> {
        Arc::clone(&self.table)
    }

    /// Shared handle to the metrics registry.
    pub fn metrics(&self) -> Arc<MetricsRegistry> {
        Arc::clone(&self.metrics)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> GateState {
        self.state.get()
    }

    /// Observable state handle that outlives [`Gate::run`].
    pub fn state_handle(&self) -> GateStateHandle {
        self.state.clone()
    }

    /// Installs the configured bootstrap routes.
    ///
    /// The console service, when configured, gets the default catch-all
    /// route at prefix `/`; any further definitions from
    /// `gate.bootstrap_routes` follow. A definition that fails to register
    /// is logged and skipped, never fatal.
    pub fn seed_bootstrap_routes(&self) {
        if let Some(console) = &self.settings.services.console {
            let upstream = format!("http://{}:{}", console.host, console.port);
            let definition = RouteDefinition::new(CONSOLE_ROUTE_ID, "", "/", &upstream);
            match self.table.add(definition) {
                Ok(route) => info!("installed console bootstrap route to {}", route.upstream),
                Err(err) => warn!("failed to install console bootstrap route: {err}"),
            }
        }

        for definition in self.settings.gate.bootstrap_routes.clone() {
            let id = definition.id.clone();
            match self.table.add(definition) {
                Ok(route) => info!("installed bootstrap route {} to {}", route.id, route.upstream),
                Err(err) => warn!("failed to install bootstrap route {id}: {err}"),
            }
        }
    }

    /// Binds both listeners and serves until a termination signal, then
    /// drains and stops. Consumes the gate; `stopped` is terminal.
    ///
    /// # Errors
    ///
    /// - `GateError::ListenerBind` when either listener cannot bind
    /// - `GateError::ListenerFailed` when a listener dies while serving
    /// - `GateError::ShutdownTimeout` when the drain deadline elapses with
    ///   requests still in flight
    pub async fn run(self) -> Result<(), GateError> {
        self.state.set(GateState::Starting);

        let dispatcher = RequestDispatcher::new(
            Arc::clone(&self.table),
            Arc::clone(&self.metrics),
            self.challenges.clone(),
        );

        let data_addr = format!("{}:{}", self.settings.gate.host, self.settings.gate.ports.http);
        let management_addr = format!(
            "{}:{}",
            self.settings.gate.host,
            self.settings.management_port()
        );

        let data_server = HttpServer::new(move || {
            App::new()
                .wrap(Logger::new(ACCESS_LOG_FORMAT))
                .configure(|cfg| proxy::configure_gate(cfg, dispatcher.clone()))
        })
        .disable_signals()
        .shutdown_timeout(DRAIN_DEADLINE.as_secs())
        .bind(&data_addr)
        .map_err(|e| self.bind_failure("data", &data_addr, e))?
        .run();

        let table_data = web::Data::from(Arc::clone(&self.table));
        let metrics_data = web::Data::from(Arc::clone(&self.metrics));
        let management_server = HttpServer::new(move || {
            App::new()
                .wrap(Logger::new(ACCESS_LOG_FORMAT))
                .app_data(table_data.clone())
                .app_data(metrics_data.clone())
                .configure(management::configure_management)
        })
        .disable_signals()
        .shutdown_timeout(DRAIN_DEADLINE.as_secs())
        .bind(&management_addr)
        .map_err(|e| self.bind_failure("management", &management_addr, e))?
        .run();

        let data_handle = data_server.handle();
        let management_handle = management_server.handle();

        let mut data_task = tokio::spawn(data_server);
        let mut management_task = tokio::spawn(management_server);

        self.state.set(GateState::Serving);
        info!("gate serving on {data_addr}, management plane on {management_addr}");

        let failure = tokio::select! {
            _ = shutdown_signal() => {
                info!("termination signal received, draining");
                None
            }
            result = &mut data_task => Some(listener_failure("data", result)),
            result = &mut management_task => Some(listener_failure("management", result)),
        };

        self.state.set(GateState::Draining);

        let drain = async {
            data_handle.stop(true).await;
            management_handle.stop(true).await;
        };

        if timeout(DRAIN_DEADLINE, drain).await.is_err() {
            self.state.set(GateState::Stopped);
            error!("drain deadline elapsed, abandoning in-flight requests");
            return Err(GateError::ShutdownTimeout);
        }

        data_task.abort();
        management_task.abort();
        self.state.set(GateState::Stopped);

        match failure {
            Some(err) => {
                error!("{err}");
                Err(err)
            }
            None => {
                info!("gate stopped");
                Ok(())
            }
        }
    }

    fn bind_failure(&self, listener: &'static str, addr: &str, err: std::io::Error) -> GateError {
        self.state.set(GateState::Stopped);
        GateError::ListenerBind {
            listener,
            addr: addr.to_string(),
            message: err.to_string(),
        }
    }
}

/// Maps an exited server task to the error surfaced to the caller.
fn listener_failure(
    listener: &'static str,
    result: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> GateError {
    let message = match result {
        Ok(Ok(())) => "listener exited".to_string(),
        Ok(Err(err)) => err.to_string(),
        Err(err) => err.to_string(),
    };
    GateError::ListenerFailed { listener, message }
}

/// Resolves when the process receives SIGINT or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(err) => {
                warn!("cannot install SIGTERM handler, falling back to SIGINT only: {err}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
