use crate::models::error::GateError;
use crate::models::route::RouteDefinition;
use serde::{Deserialize, Serialize};

/// Offset between the data-plane port and the management listener.
const MANAGEMENT_PORT_OFFSET: u16 = 1000;

fn default_acme_cache_dir() -> String {
    "./data/acme".to_string()
}

fn default_console_host() -> String {
    "127.0.0.1".to_string()
}

/// Listener port pair for the gate.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PortSettings {
    /// Data-plane HTTP port (1..65535).
    pub http: u16,
    /// HTTPS port reserved for the TLS front (1..65535).
    pub https: u16,
}

/// ACME challenge configuration.
///
/// The gate only serves HTTP-01 challenge responses; issuing and renewing
/// certificates is owned by the certificate manager, which writes pending
/// challenge files into `cache_dir`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AcmeSettings {
    /// Account e-mail. An empty string disables challenge interception.
    #[serde(default)]
    pub email: String,

    /// Directory the certificate manager stores pending challenges in.
    #[serde(default = "default_acme_cache_dir")]
    pub cache_dir: String,
}

impl Default for AcmeSettings {
    fn default() -> Self {
        Self {
            email: String::new(),
            cache_dir: default_acme_cache_dir(),
        }
    }
}

/// Gate-specific configuration.
///
/// # Configuration File Format
///
/// ```yaml
/// gate:
///   host: 0.0.0.0
///   ports:
///     http: 8080
///     https: 8443
///   acme:
///     email: ""
///     cache_dir: ./data/acme
///   bootstrap_routes:
///     - id: api
///       host: api.example.com
///       path_prefix: /v1
///       upstream: http://127.0.0.1:8081
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GateSettings {
    /// Bind address for both listeners.
    pub host: String,

    /// Listener ports. The management plane binds `ports.http + 1000`.
    pub ports: PortSettings,

    /// ACME challenge settings.
    #[serde(default)]
    pub acme: AcmeSettings,

    /// Routes installed at startup in addition to the console default.
    /// A definition that fails to register is logged and skipped.
    #[serde(default)]
    pub bootstrap_routes: Vec<RouteDefinition>,
}

/// Location of the console service, used to seed the default route.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConsoleSettings {
    /// Console host, without scheme.
    #[serde(default = "default_console_host")]
    pub host: String,
    /// Console HTTP port.
    pub port: u16,
}

/// Upstream control-plane services the gate fronts.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ServiceSettings {
    /// The console API. When present, the gate installs a catch-all route
    /// at prefix `/` forwarding to it.
    #[serde(default)]
    pub console: Option<ConsoleSettings>,
}

/// Complete gate configuration as loaded from `./configs/<env>.yaml`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Settings {
    /// Gate listener and ACME configuration.
    pub gate: GateSettings,

    /// Surrounding control-plane services.
    #[serde(default)]
    pub services: ServiceSettings,
}

impl Settings {
    /// Validates the configuration before the gate starts.
    ///
    /// # Errors
    ///
    /// Returns `GateError::ConfigInvalid` when:
    /// - `gate.host` is empty
    /// - either port is 0
    /// - the derived management port (`ports.http + 1000`) does not fit in
    ///   a port number
    /// - a console service is configured with port 0
    pub fn validate(&self) -> Result<(), GateError> {
        if self.gate.host.trim().is_empty() {
            return Err(GateError::ConfigInvalid(
                "gate.host must not be empty".to_string(),
            ));
        }

        if self.gate.ports.http == 0 {
            return Err(GateError::ConfigInvalid(
                "gate.ports.http must be between 1 and 65535".to_string(),
            ));
        }

        if self.gate.ports.https == 0 {
            return Err(GateError::ConfigInvalid(
                "gate.ports.https must be between 1 and 65535".to_string(),
            ));
        }

        if self.gate.ports.http.checked_add(MANAGEMENT_PORT_OFFSET).is_none() {
            return Err(GateError::ConfigInvalid(format!(
                "management port {} + {} exceeds 65535",
                self.gate.ports.http, MANAGEMENT_PORT_OFFSET
            )));
        }

        if let Some(console) = &self.services.console {
            if console.port == 0 {
                return Err(GateError::ConfigInvalid(
                    "services.console.port must be between 1 and 65535".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// The management listener port, by convention the data port plus 1000.
    ///
    /// Callers must run [`Settings::validate`] first; validation guarantees
    /// the sum fits in a port number.
    pub fn management_port(&self) -> u16 {
        self.gate.ports.http.saturating_add(MANAGEMENT_PORT_OFFSET)
    }

    /// Whether the ACME challenge interceptor is enabled.
    pub fn acme_enabled(&self) -> bool {
        !self.gate.acme.email.is_empty()
    }
}
