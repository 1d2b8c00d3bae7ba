//! The session toggle state machine.
//!
//! `SessionToggle` is the single authority over whether the screen shows a
//! running or stopped session. It makes every decision synchronously and
//! leaves I/O to the caller: the app reads preferences, talks to the
//! tracking capability and persists the status flag based on what these
//! methods return.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capabilities::SessionId;
use crate::config::{SessionParams, TrackingConfiguration, ValidationError};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToggleState {
    #[default]
    Stopped,
    Running,
}

impl ToggleState {
    #[must_use]
    pub const fn from_active(active: bool) -> Self {
        if active {
            Self::Running
        } else {
            Self::Stopped
        }
    }

    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ToggleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeCause {
    /// The user toggled the control.
    User,
    /// The persisted status disagreed with the visible state.
    Reconcile,
}

/// A visible state change. `revision` increases by one with every change so
/// observers can tell a new change from a re-render of the same one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub from: ToggleState,
    pub to: ToggleState,
    pub cause: ChangeCause,
    pub revision: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleIntent {
    /// A start attempt is already waiting on the configuration read.
    Busy,
    /// The caller must read the configuration and hand it to
    /// [`SessionToggle::complete_start`].
    LoadConfiguration,
    /// The session was stopped; the caller stops the collaborator and
    /// persists `active = false`.
    Stopped {
        session_id: Option<SessionId>,
        change: StateChange,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartDecision {
    /// The caller starts the collaborator and persists `active = true`.
    Start {
        session_id: SessionId,
        params: SessionParams,
        change: StateChange,
    },
    /// A reconcile observed a running session while the configuration was
    /// being read, so there is nothing left to start.
    AlreadyRunning,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToggle {
    state: ToggleState,
    start_pending: bool,
    session: Option<SessionId>,
    revision: u64,
    last_change: Option<StateChange>,
}

impl SessionToggle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> ToggleState {
        self.state
    }

    #[must_use]
    pub const fn is_start_pending(&self) -> bool {
        self.start_pending
    }

    /// The session this core started and has not yet stopped.
    #[must_use]
    pub const fn session(&self) -> Option<SessionId> {
        self.session
    }

    /// Bumped on every visible transition.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub const fn last_change(&self) -> Option<StateChange> {
        self.last_change
    }

    /// Mirrors the persisted status into the visible state. Never starts or
    /// stops anything; returns `None` when the state already matched.
    pub fn reconcile(&mut self, active: bool) -> Option<StateChange> {
        let target = ToggleState::from_active(active);
        if target == self.state {
            return None;
        }

        if !active {
            // Stopped behind our back; the handle no longer refers to anything.
            self.session = None;
        }

        Some(self.transition(target, ChangeCause::Reconcile))
    }

    pub fn request_toggle(&mut self) -> ToggleIntent {
        if self.start_pending {
            return ToggleIntent::Busy;
        }

        match self.state {
            ToggleState::Stopped => {
                self.start_pending = true;
                ToggleIntent::LoadConfiguration
            }
            ToggleState::Running => {
                let session_id = self.session.take();
                let change = self.transition(ToggleState::Stopped, ChangeCause::User);
                ToggleIntent::Stopped { session_id, change }
            }
        }
    }

    /// Finishes a start attempt begun by [`SessionToggle::request_toggle`].
    /// On a validation error the state is left at `Stopped`.
    pub fn complete_start(
        &mut self,
        config: &TrackingConfiguration,
    ) -> Result<StartDecision, ValidationError> {
        self.start_pending = false;

        if self.state.is_running() {
            return Ok(StartDecision::AlreadyRunning);
        }

        let params = config.validate()?;
        let session_id = SessionId::generate();
        self.session = Some(session_id);
        let change = self.transition(ToggleState::Running, ChangeCause::User);

        Ok(StartDecision::Start {
            session_id,
            params,
            change,
        })
    }

    fn transition(&mut self, to: ToggleState, cause: ChangeCause) -> StateChange {
        self.revision = self.revision.saturating_add(1);
        let change = StateChange {
            from: self.state,
            to,
            cause,
            revision: self.revision,
        };
        self.state = to;
        self.last_change = Some(change);
        change
    }
}
