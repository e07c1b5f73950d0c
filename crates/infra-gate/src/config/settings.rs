use crate::models::error::GateError;
use crate::models::settings::Settings;

use log::debug;
use std::path::Path;

/// Environment selected when neither environment variable is set.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Directory the per-environment configuration files live in, relative to
/// the working directory.
const CONFIG_DIR: &str = "./configs";

/// Resolves the active environment name.
///
/// `ENVIRONMENT` wins over `INFRA_CORE_ENV`; empty values are treated as
/// unset. Defaults to `development`.
pub fn environment_name() -> String {
    std::env::var("ENVIRONMENT")
        .ok()
        .filter(|value| !value.is_empty())
        .or_else(|| {
            std::env::var("INFRA_CORE_ENV")
                .ok()
                .filter(|value| !value.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
}

/// Loads, overrides, and validates the gate configuration.
///
/// Reads `./configs/<env>.yaml`, applies `INFRA_CORE_GATE_*` environment
/// overrides, then validates. All failures here are fatal to startup.
///
/// # Errors
///
/// - `GateError::ConfigMissing` when the file does not exist
/// - `GateError::ConfigInvalid` for unreadable or malformed YAML, an
///   unparsable override value, or a configuration that fails validation
pub fn load_settings() -> Result<Settings, GateError> {
    let environment = environment_name();
    let mut settings = load_settings_from(Path::new(CONFIG_DIR), &environment)?;
    apply_env_overrides(&mut settings, std::env::vars())?;
    settings.validate()?;
    debug!("loaded configuration for environment '{environment}'");
    Ok(settings)
}

/// Reads and parses one environment's configuration file from `dir`.
///
/// Validation is left to the caller so overrides can be layered in between;
/// [`load_settings`] composes the full pipeline.
///
/// # Errors
///
/// `GateError::ConfigMissing` when the file is absent,
/// `GateError::ConfigInvalid` when it cannot be read or parsed.
pub fn load_settings_from(dir: &Path, environment: &str) -> Result<Settings, GateError> {
    let path = dir.join(format!("{environment}.yaml"));
    if !path.exists() {
        return Err(GateError::ConfigMissing(path.display().to_string()));
    }

    let raw = std::fs::read_to_string(&path).map_err(|e| {
        GateError::ConfigInvalid(format!("cannot read {}: {e}", path.display()))
    })?;

    serde_yaml::from_str(&raw)
        .map_err(|e| GateError::ConfigInvalid(format!("{}: {e}", path.display())))
}

/// Applies `INFRA_CORE_GATE_*` overrides onto parsed settings.
///
/// The variables are passed in rather than read here, which keeps override
/// behavior deterministic under test. Unknown keys are ignored; recognized
/// keys replace the file value wholesale.
///
/// # Recognized Variables
///
/// - `INFRA_CORE_GATE_HOST`
/// - `INFRA_CORE_GATE_HTTP_PORT`
/// - `INFRA_CORE_GATE_HTTPS_PORT`
/// - `INFRA_CORE_GATE_ACME_EMAIL`
/// - `INFRA_CORE_GATE_ACME_CACHE_DIR`
///
/// # Errors
///
/// `GateError::ConfigInvalid` when a port override does not parse as a
/// port number.
pub fn apply_env_overrides(
    settings: &mut Settings,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<(), GateError> {
    for (key, value) in vars {
        match key.as_str() {
            "INFRA_CORE_GATE_HOST" => settings.gate.host = value,
            "INFRA_CORE_GATE_HTTP_PORT" => {
                settings.gate.ports.http = parse_port_override(&key, &value)?
            }
            "INFRA_CORE_GATE_HTTPS_PORT" => {
                settings.gate.ports.https = parse_port_override(&key, &value)?
            }
            "INFRA_CORE_GATE_ACME_EMAIL" => settings.gate.acme.email = value,
            "INFRA_CORE_GATE_ACME_CACHE_DIR" => settings.gate.acme.cache_dir = value,
            _ => {}
        }
    }
    Ok(())
}

fn parse_port_override(key: &str, value: &str) -> Result<u16, GateError> {
    value.parse::<u16>().map_err(|_| {
        GateError::ConfigInvalid(format!("{key} must be a port number, got '{value}'"))
    })
}
