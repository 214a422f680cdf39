//! Stateless rule dispatch to switch connections.
//!
//! # Responsibilities
//! - Look up the live connection for a rule's target switch
//! - Post the install command, fire-and-forget
//!
//! # Design Decisions
//! - Tracks nothing: a missing connection is reported, not remembered;
//!   the controller is simply re-invoked on the flow's next packet
//! - Path installation walks hops backend-edge first so no hop forwards
//!   before its downstream rule exists

use thiserror::Error;

use crate::channel::{ConnectionRegistry, SendError, SwitchCommand};
use crate::rules::FlowRule;
use crate::topology::SwitchId;

/// Why a rule could not be installed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    #[error("no live connection for switch {0}")]
    NotConnected(SwitchId),

    #[error("send to switch {switch} failed: {source}")]
    Send {
        switch: SwitchId,
        source: SendError,
    },
}

/// Dispatches synthesized rules to the right control-channel connection.
#[derive(Debug, Default)]
pub struct RuleInstaller;

impl RuleInstaller {
    pub fn new() -> Self {
        Self
    }

    /// Install one rule on its target switch.
    pub fn install(
        &self,
        registry: &ConnectionRegistry,
        rule: FlowRule,
    ) -> Result<(), InstallError> {
        let switch = rule.switch.clone();
        let connection = registry
            .get(&switch)
            .ok_or_else(|| InstallError::NotConnected(switch.clone()))?;

        tracing::debug!(switch = %switch, priority = rule.priority, "installing flow rule");
        connection
            .send(SwitchCommand::InstallRule(rule))
            .map_err(|source| InstallError::Send { switch, source })
    }

    /// Install a forward-path rule set, furthest-from-ingress hop first.
    /// A hop without a live connection degrades that hop only; the rest of
    /// the path still installs.
    pub fn install_path(&self, registry: &ConnectionRegistry, rules: Vec<FlowRule>) {
        for rule in rules.into_iter().rev() {
            let switch = rule.switch.clone();
            if let Err(error) = self.install(registry, rule) {
                tracing::warn!(switch = %switch, %error, "hop installation degraded");
            }
        }
    }
}
