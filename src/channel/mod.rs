//! Control-channel seam.
//!
//! # Data Flow
//! ```text
//! External control-channel runtime (session bring-up, message codec)
//!     → ControlEvent (ConnectionUp / PacketIn) via ControllerHandle
//!     → engine dispatch
//!     → SwitchCommand (InstallRule / PacketOut) via SwitchConnection::send
//! ```
//!
//! # Design Decisions
//! - The runtime is a collaborator behind a trait: the core never opens
//!   sockets or encodes OpenFlow, it only posts commands
//! - Sends are fire-and-forget; a failed send degrades, it never retries
//! - The registry is engine-owned state with an explicit lifecycle, not a
//!   module-level global

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::rules::{Action, FlowRule};
use crate::topology::{PortNo, SwitchId};

/// An event delivered by the control-channel runtime.
#[derive(Debug, Clone)]
pub enum ControlEvent {
    /// A switch session came up; register its connection handle.
    ConnectionUp {
        switch: SwitchId,
        connection: Arc<dyn SwitchConnection>,
    },
    /// A packet reached the controller from `switch` on `in_port`.
    PacketIn {
        switch: SwitchId,
        in_port: PortNo,
        frame: Vec<u8>,
    },
}

/// A command posted back to one switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchCommand {
    InstallRule(FlowRule),
    /// Send a raw frame through the switch immediately, applying `actions`.
    PacketOut { frame: Vec<u8>, actions: Vec<Action> },
}

/// Posting a command to the runtime failed (session torn down mid-send).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("control channel send failed: {0}")]
pub struct SendError(pub String);

/// A live control-channel session with one switch. Owned and implemented by
/// the external runtime; the core only looks handles up and calls `send`.
pub trait SwitchConnection: Send + Sync + fmt::Debug {
    fn send(&self, command: SwitchCommand) -> Result<(), SendError>;
}

/// switch identifier → live connection. Mutated only by the engine's
/// ConnectionUp handling; dispatch is strictly sequential, so no locking.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<SwitchId, Arc<dyn SwitchConnection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace, on reconnect) the connection for a switch.
    pub fn register(&mut self, switch: SwitchId, connection: Arc<dyn SwitchConnection>) {
        self.connections.insert(switch, connection);
    }

    pub fn get(&self, switch: &SwitchId) -> Option<&Arc<dyn SwitchConnection>> {
        self.connections.get(switch)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

/// The sending side handed to a control-channel runtime so it can deliver
/// events into the engine's single-consumer loop.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<ControlEvent>,
}

impl ControllerHandle {
    pub fn new(tx: mpsc::Sender<ControlEvent>) -> Self {
        Self { tx }
    }

    /// Deliver one event; fails only once the engine has shut down.
    pub async fn deliver(&self, event: ControlEvent) -> Result<(), SendError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| SendError("engine event loop stopped".to_string()))
    }
}
