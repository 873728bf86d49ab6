//! Server Lifecycle State Machine
//!
//! Tracks one server instance from creation to close, including the
//! self-healing detour through `Recovering` after a transport failure.

use std::net::SocketAddr;

/// Lifecycle state of a server instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Constructed, socket not bound yet
    Created,
    /// Socket bound, blocking on receive
    Listening { addr: SocketAddr },
    /// Listening loop unwound, waiting to rebind
    Recovering,
    /// Socket released by an explicit close
    Closed,
}

/// Events that can trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Socket bound on the given address
    Bound(SocketAddr),
    /// Bind or receive failed
    TransportFailed,
    /// External close call
    CloseRequested,
}

/// Result of a state transition attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition was valid and state changed
    Success(ServerState),
    /// Transition was invalid from current state
    Invalid { from: ServerState, event: LifecycleEvent },
}

/// The lifecycle state machine for a server instance
#[derive(Debug)]
pub struct Lifecycle {
    current_state: ServerState,
    restarts: u32,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Create a new state machine in Created state
    pub fn new() -> Self {
        Self {
            current_state: ServerState::Created,
            restarts: 0,
        }
    }

    /// Get current state
    pub fn state(&self) -> ServerState {
        self.current_state
    }

    /// Number of times the listener went through recovery
    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    pub fn is_closed(&self) -> bool {
        self.current_state == ServerState::Closed
    }

    /// Process an event and return the transition result
    pub fn process_event(&mut self, event: LifecycleEvent) -> TransitionResult {
        match self.get_next_state(&event) {
            Some(state) => {
                if state == ServerState::Recovering && self.current_state != ServerState::Recovering {
                    self.restarts += 1;
                }
                self.current_state = state;
                TransitionResult::Success(state)
            }
            None => TransitionResult::Invalid {
                from: self.current_state,
                event,
            },
        }
    }

    /// Get the next state for a given event, if the transition is valid
    fn get_next_state(&self, event: &LifecycleEvent) -> Option<ServerState> {
        use LifecycleEvent::*;
        use ServerState::*;

        match (self.current_state, event) {
            // Closed is terminal
            (Closed, _) => None,

            (_, CloseRequested) => Some(Closed),

            (Created | Recovering, Bound(addr)) => Some(Listening { addr: *addr }),

            (Created | Listening { .. } | Recovering, TransportFailed) => Some(Recovering),

            // Already bound
            _ => None,
        }
    }
}
