use tracing::{debug, info, instrument, warn};

use crate::capabilities::{encode_value, Capabilities, KvError, PreferenceKey};
use crate::config::{TrackingConfiguration, CONFIGURATION_KEYS};
use crate::event::{Event, SlotAnswer};
use crate::model::{Model, StatusSnapshot, STATUS_KEYS};
use crate::reads::{BatchResult, ReadPurpose};
use crate::toggle::{StartDecision, StateChange, ToggleIntent};
use crate::view::{AlertView, IndicatorView, ViewModel};

#[derive(Default)]
pub struct App;

impl App {
    /// Issues one `get` per key; answers are joined in `model.reads`.
    fn read_preferences(
        purpose: ReadPurpose,
        keys: &[PreferenceKey],
        model: &mut Model,
        caps: &Capabilities,
    ) {
        let slots = model.reads.begin(purpose, keys);

        for (key, slot) in keys.iter().zip(slots) {
            caps.kv.get(key.as_str().to_string(), move |result| {
                Event::PreferenceRead(Box::new(SlotAnswer {
                    slot,
                    result: result.map_err(KvError::from),
                }))
            });
        }
    }

    #[instrument(skip_all)]
    fn read_status(model: &mut Model, caps: &Capabilities) {
        let revision = model.toggle.revision();
        Self::read_preferences(ReadPurpose::Status { revision }, &STATUS_KEYS, model, caps);
    }

    #[instrument(skip(caps))]
    fn persist_status(active: bool, caps: &Capabilities) {
        let bytes = match encode_value(&active) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(active, error = %e, "failed to encode service status");
                return;
            }
        };

        caps.kv.set(
            PreferenceKey::ServiceStatus.as_str().to_string(),
            bytes,
            move |result| Event::StatusWritten {
                active,
                result: Box::new(result.map(|_| ()).map_err(KvError::from)),
            },
        );
    }

    fn apply_status(issued_at: u64, result: BatchResult, model: &mut Model, caps: &Capabilities) {
        if issued_at != model.toggle.revision() {
            // The toggle moved while this read was in flight, so the value
            // may predate our own write. Read again.
            debug!(
                issued_at,
                current = model.toggle.revision(),
                "discarding stale status read"
            );
            Self::read_status(model, caps);
            return;
        }

        let Some(snapshot) = StatusSnapshot::from_result(result) else {
            return;
        };

        model.device_id = snapshot.device_id;
        if let Some(change) = model.toggle.reconcile(snapshot.active) {
            Self::log_change(&change);
        }

        caps.render.render();
    }

    fn apply_configuration(result: BatchResult, model: &mut Model, caps: &Capabilities) {
        let config = TrackingConfiguration::from_result(result);
        if config.device_id.is_some() {
            model.device_id.clone_from(&config.device_id);
        }

        match model.toggle.complete_start(&config) {
            Ok(StartDecision::Start {
                session_id,
                params,
                change,
            }) => {
                info!(
                    session_id = %session_id,
                    server_url = %params.server_url,
                    frequency_secs = params.frequency_secs,
                    "starting tracking session"
                );
                caps.tracking.start(session_id, params);
                Self::persist_status(true, caps);
                model.clear_alert();

                Self::log_change(&change);
            }
            Ok(StartDecision::AlreadyRunning) => {
                debug!("session reported running while configuration was read");
            }
            Err(e) => {
                warn!(code = e.code(), error = %e, "tracking start rejected");
                model.set_alert(e);
            }
        }

        caps.render.render();
    }

    fn log_change(change: &StateChange) {
        info!(
            from = %change.from,
            to = %change.to,
            cause = ?change.cause,
            revision = change.revision,
            "toggle state changed"
        );
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(
            event = event.name(),
            user_initiated = event.is_user_initiated(),
            "handling event"
        );

        match event {
            Event::ScreenAppeared => {
                model.screen.visible = true;
                Self::read_status(model, caps);
            }

            Event::ScreenDisappeared => {
                model.screen.visible = false;
            }

            Event::AppForegrounded => {
                model.screen.foreground = true;
                if model.screen.visible {
                    Self::read_status(model, caps);
                }
            }

            Event::AppBackgrounded => {
                model.screen.foreground = false;
            }

            Event::StatusChangedExternally => {
                if model.screen.is_observing() {
                    Self::read_status(model, caps);
                } else {
                    debug!("screen not observing, status change deferred to next appearance");
                }
            }

            Event::PreferenceRead(answer) => {
                let SlotAnswer { slot, result } = *answer;
                let Some((purpose, result)) = model.reads.record(slot, result) else {
                    return;
                };

                match purpose {
                    ReadPurpose::Status { revision } => {
                        Self::apply_status(revision, result, model, caps);
                    }
                    ReadPurpose::Configuration => Self::apply_configuration(result, model, caps),
                }
            }

            Event::ToggleRequested => match model.toggle.request_toggle() {
                ToggleIntent::Busy => {
                    debug!("start already pending, toggle ignored");
                }

                ToggleIntent::LoadConfiguration => {
                    Self::read_preferences(
                        ReadPurpose::Configuration,
                        &CONFIGURATION_KEYS,
                        model,
                        caps,
                    );
                }

                ToggleIntent::Stopped { session_id, change } => {
                    caps.tracking.stop(session_id);
                    Self::persist_status(false, caps);
                    model.clear_alert();

                    Self::log_change(&change);
                    caps.render.render();
                }
            },

            Event::StatusWritten { active, result } => match *result {
                Ok(_) => debug!(active, "service status persisted"),
                // The transition already happened; the next reconcile will
                // surface whatever the store actually holds.
                Err(e) => warn!(active, error = %e, "failed to persist service status"),
            },

            Event::AlertDismissed => {
                model.clear_alert();
                caps.render.render();
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        let state = model.toggle_state();

        ViewModel {
            toggle_state: state,
            indicator: IndicatorView {
                running: state.is_running(),
                ripple_active: state.is_running(),
                change: model.toggle.last_change(),
            },
            tracking_number: model.device_id.clone(),
            alert: model.alert.as_ref().map(AlertView::from),
        }
    }
}
