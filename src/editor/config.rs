// SPDX-License-Identifier: MIT

//! Server configuration
//!
//! Values come from the environment (a `.env` file is loaded first by the
//! binary) and can be overridden by command line flags.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::engine::FlowError;

pub const HOST_VAR: &str = "BRANCHFLOW_HOST";
pub const PORT_VAR: &str = "BRANCHFLOW_PORT";
pub const WORKFLOW_VAR: &str = "BRANCHFLOW_WORKFLOW";

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Workflow document to seed the editor with
    pub workflow: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            workflow: None,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, FlowError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FlowError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup(HOST_VAR) {
            config.host = host.parse().map_err(|_| {
                FlowError::config(format!("{} is not an IP address: {}", HOST_VAR, host))
            })?;
        }
        if let Some(port) = lookup(PORT_VAR) {
            config.port = port.parse().map_err(|_| {
                FlowError::config(format!("{} is not a port: {}", PORT_VAR, port))
            })?;
        }
        if let Some(workflow) = lookup(WORKFLOW_VAR).filter(|w| !w.is_empty()) {
            config.workflow = Some(PathBuf::from(workflow));
        }

        Ok(config)
    }

    /// Apply command line overrides on top of this configuration
    pub fn with_overrides(
        mut self,
        host: Option<IpAddr>,
        port: Option<u16>,
        workflow: Option<PathBuf>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if workflow.is_some() {
            self.workflow = workflow;
        }
        self
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_env_values() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            (HOST_VAR, "0.0.0.0"),
            (PORT_VAR, "8080"),
            (WORKFLOW_VAR, "flows/onboarding.yaml"),
        ]))
        .unwrap();
        assert_eq!(config.addr().to_string(), "0.0.0.0:8080");
        assert_eq!(
            config.workflow,
            Some(PathBuf::from("flows/onboarding.yaml"))
        );
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup_from(&[(PORT_VAR, "eighty")])).unwrap_err();
        assert!(matches!(err, FlowError::Config(_)));
        assert!(err.to_string().contains("BRANCHFLOW_PORT"));
    }

    #[test]
    fn test_invalid_host() {
        let result = ServerConfig::from_lookup(lookup_from(&[(HOST_VAR, "localhost:80")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_win() {
        let config = ServerConfig::from_lookup(lookup_from(&[(PORT_VAR, "8080")]))
            .unwrap()
            .with_overrides(None, Some(9000), Some(PathBuf::from("a.json")));
        assert_eq!(config.port, 9000);
        assert_eq!(config.workflow, Some(PathBuf::from("a.json")));
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
}
