//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (paths reference existing endpoints/backends)
//! - Check path-table completeness: every (endpoint, backend) pair covered
//! - Check hop sequences start and end at the right attachment switches
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: BalancerConfig -> Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted; a gap found here fails startup
//!   instead of failing per-packet later

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::config::schema::{BalancerConfig, OwnershipMode};

/// One semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("backend set is empty; the hasher cannot select from zero backends")]
    EmptyBackendSet,

    #[error("no client endpoints configured")]
    NoEndpoints,

    #[error("duplicate backend name '{0}'")]
    DuplicateBackendName(String),

    #[error("duplicate backend address {0}")]
    DuplicateBackendAddress(String),

    #[error("duplicate endpoint name '{0}'")]
    DuplicateEndpointName(String),

    #[error("duplicate endpoint address {0}")]
    DuplicateEndpointAddress(String),

    #[error("ownership is 'static' but no virtual service MAC is configured")]
    StaticOwnershipWithoutMac,

    #[error("rule priority must be greater than the table-miss priority (0)")]
    ZeroRulePriority,

    #[error("path references unknown endpoint '{0}'")]
    UnknownPathEndpoint(String),

    #[error("path references unknown backend '{0}'")]
    UnknownPathBackend(String),

    #[error("path {endpoint} -> {backend} has no hops")]
    EmptyHopList { endpoint: String, backend: String },

    #[error("path {endpoint} -> {backend} starts at {found}, expected the endpoint's switch {expected}")]
    PathStartMismatch {
        endpoint: String,
        backend: String,
        found: String,
        expected: String,
    },

    #[error("path {endpoint} -> {backend} ends at {found}, expected the backend's switch {expected}")]
    PathEndMismatch {
        endpoint: String,
        backend: String,
        found: String,
        expected: String,
    },

    #[error("duplicate path entry for {endpoint} -> {backend}")]
    DuplicatePath { endpoint: String, backend: String },

    #[error("missing path entry for {endpoint} -> {backend}")]
    MissingPath { endpoint: String, backend: String },
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backends.is_empty() {
        errors.push(ValidationError::EmptyBackendSet);
    }
    if config.endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }

    let mut backend_names = HashSet::new();
    let mut backend_ips = HashSet::new();
    for backend in &config.backends {
        if !backend_names.insert(backend.name.as_str()) {
            errors.push(ValidationError::DuplicateBackendName(backend.name.clone()));
        }
        if !backend_ips.insert(backend.ip) {
            errors.push(ValidationError::DuplicateBackendAddress(
                backend.ip.to_string(),
            ));
        }
    }

    let mut endpoint_names = HashSet::new();
    let mut endpoint_ips = HashSet::new();
    for endpoint in &config.endpoints {
        if !endpoint_names.insert(endpoint.name.as_str()) {
            errors.push(ValidationError::DuplicateEndpointName(
                endpoint.name.clone(),
            ));
        }
        if !endpoint_ips.insert(endpoint.ip) {
            errors.push(ValidationError::DuplicateEndpointAddress(
                endpoint.ip.to_string(),
            ));
        }
    }

    if config.virtual_service.effective_ownership() == OwnershipMode::Static
        && config.virtual_service.mac.is_none()
    {
        errors.push(ValidationError::StaticOwnershipWithoutMac);
    }

    if config.rules.priority == 0 {
        errors.push(ValidationError::ZeroRulePriority);
    }

    let endpoint_switches: HashMap<&str, _> = config
        .endpoints
        .iter()
        .map(|e| (e.name.as_str(), &e.switch))
        .collect();
    let backend_switches: HashMap<&str, _> = config
        .backends
        .iter()
        .map(|b| (b.name.as_str(), &b.switch))
        .collect();

    let mut seen_pairs = HashSet::new();
    for path in &config.paths {
        let endpoint_switch = endpoint_switches.get(path.endpoint.as_str()).copied();
        let backend_switch = backend_switches.get(path.backend.as_str()).copied();

        if endpoint_switch.is_none() {
            errors.push(ValidationError::UnknownPathEndpoint(path.endpoint.clone()));
        }
        if backend_switch.is_none() {
            errors.push(ValidationError::UnknownPathBackend(path.backend.clone()));
        }

        if !seen_pairs.insert((path.endpoint.as_str(), path.backend.as_str())) {
            errors.push(ValidationError::DuplicatePath {
                endpoint: path.endpoint.clone(),
                backend: path.backend.clone(),
            });
        }

        let (first, last) = match (path.hops.first(), path.hops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                errors.push(ValidationError::EmptyHopList {
                    endpoint: path.endpoint.clone(),
                    backend: path.backend.clone(),
                });
                continue;
            }
        };

        if let Some(expected) = endpoint_switch {
            if &first.switch != expected {
                errors.push(ValidationError::PathStartMismatch {
                    endpoint: path.endpoint.clone(),
                    backend: path.backend.clone(),
                    found: first.switch.to_string(),
                    expected: expected.to_string(),
                });
            }
        }
        if let Some(expected) = backend_switch {
            if &last.switch != expected {
                errors.push(ValidationError::PathEndMismatch {
                    endpoint: path.endpoint.clone(),
                    backend: path.backend.clone(),
                    found: last.switch.to_string(),
                    expected: expected.to_string(),
                });
            }
        }
    }

    // Completeness: every pair the engine can ever select must have a path.
    for endpoint in &config.endpoints {
        for backend in &config.backends {
            if !seen_pairs.contains(&(endpoint.name.as_str(), backend.name.as_str())) {
                errors.push(ValidationError::MissingPath {
                    endpoint: endpoint.name.clone(),
                    backend: backend.name.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
