//! Resolution of the application's network endpoints from manifest properties.
use std::fmt;

use crate::factory::error::AssemblyError;
use crate::kernel::constants::{APP_HTTP_DOMAIN_KEY, APP_HTTP_PORT_KEY};
use crate::manifest::ConfigModel;

/// Protocol whose port is configured by `app.http.port`.
pub const HTTP_PROTOCOL: &str = "http";

/// An endpoint descriptor: where the application is reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPort {
    protocol: Option<String>,
    domain: Option<String>,
    port: Option<u16>,
    app_root: String,
}

impl AppPort {
    pub fn new(
        protocol: Option<String>,
        domain: Option<String>,
        port: Option<u16>,
        app_root: impl Into<String>,
    ) -> Self {
        Self {
            protocol,
            domain,
            port,
            app_root: app_root.into(),
        }
    }

    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn app_root(&self) -> &str {
        &self.app_root
    }
}

impl fmt::Display for AppPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}",
            self.protocol.as_deref().unwrap_or(HTTP_PROTOCOL),
            self.domain.as_deref().unwrap_or("*")
        )?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        f.write_str(&self.app_root)
    }
}

/// Derives [`AppPort`]s from the configuration properties.
#[derive(Debug)]
pub struct PortResolver<'a> {
    config: &'a ConfigModel,
    app_root: &'a str,
}

impl<'a> PortResolver<'a> {
    pub fn new(config: &'a ConfigModel, app_root: &'a str) -> Self {
        Self { config, app_root }
    }

    /// Resolve the endpoint for `protocol`.
    ///
    /// Only `http` (or no protocol) has a port property; every other protocol
    /// resolves with the port unset. A blank port is unset; a non-numeric one
    /// is an error.
    pub fn resolve(&self, protocol: Option<&str>) -> Result<AppPort, AssemblyError> {
        let port_key = match protocol {
            None | Some(HTTP_PROTOCOL) => Some(APP_HTTP_PORT_KEY),
            Some(_) => None,
        };

        let port = match port_key.and_then(|key| self.config.property(key).map(|v| (key, v))) {
            Some((key, raw)) => parse_port(key, &raw)?,
            None => None,
        };

        Ok(AppPort::new(
            protocol.map(str::to_string),
            self.config.property(APP_HTTP_DOMAIN_KEY),
            port,
            self.app_root,
        ))
    }
}

fn parse_port(key: &str, raw: &str) -> Result<Option<u16>, AssemblyError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u16>()
        .map(Some)
        .map_err(|e| AssemblyError::InvalidProperty {
            key: key.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}
