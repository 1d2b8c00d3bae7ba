use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::config::SessionParams;

/// Identifies one tracking session instance started by this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrackingOperation {
    Start {
        session_id: SessionId,
        params: SessionParams,
    },
    /// `session_id` is `None` when the running session was not started by
    /// this instance of the core (e.g. it survived a relaunch).
    Stop { session_id: Option<SessionId> },
}

impl Operation for TrackingOperation {
    type Output = ();
}

/// Start/stop of the shell-owned background tracking session. Both are
/// notifications: the shell does not report back whether they succeeded.
pub struct Tracking<Ev> {
    context: CapabilityContext<TrackingOperation, Ev>,
}

impl<Ev> Clone for Tracking<Ev> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Tracking<Ev> {
    type Operation = TrackingOperation;
    type MappedSelf<MappedEv> = Tracking<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Tracking::new(self.context.map_event(f))
    }
}

impl<Ev> Tracking<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<TrackingOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn start(&self, session_id: SessionId, params: SessionParams) {
        self.notify(TrackingOperation::Start { session_id, params });
    }

    pub fn stop(&self, session_id: Option<SessionId>) {
        self.notify(TrackingOperation::Stop { session_id });
    }

    fn notify(&self, operation: TrackingOperation) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(operation).await;
        });
    }
}
