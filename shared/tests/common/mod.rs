#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};

use crux_core::testing::AppTester;
use crux_core::Request;
use crux_kv::error::KeyValueError;
use crux_kv::value::Value;
use crux_kv::{KeyValueOperation, KeyValueResponse, KeyValueResult};
use tracker_shared::capabilities::{decode_value, PreferenceKey, TrackingOperation};
use tracker_shared::{App, CruxApp, Effect, Event, Model, ViewModel};

/// A stand-in for the native shell: keeps preferences in memory, records
/// tracking notifications and feeds capability results back into the core.
pub struct FakeShell {
    pub app: AppTester<App, Effect>,
    pub model: Model,
    pub preferences: HashMap<String, Vec<u8>>,
    pub tracking: Vec<TrackingOperation>,
    pub writes: Vec<(String, Vec<u8>)>,
    pub reads: usize,
    pub renders: usize,
    pub fail_reads: bool,
}

enum Work {
    Event(Event),
    Effect(Effect),
}

impl FakeShell {
    pub fn new() -> Self {
        Self {
            app: AppTester::default(),
            model: Model::default(),
            preferences: HashMap::new(),
            tracking: Vec::new(),
            writes: Vec::new(),
            reads: 0,
            renders: 0,
            fail_reads: false,
        }
    }

    pub fn with_configuration(mut self, url: &str, frequency: i64) -> Self {
        self.set_preference(PreferenceKey::ServerUrl, serde_json::json!(url));
        self.set_preference(PreferenceKey::Frequency, serde_json::json!(frequency));
        self
    }

    pub fn with_device_id(mut self, device_id: &str) -> Self {
        self.set_preference(PreferenceKey::DeviceId, serde_json::json!(device_id));
        self
    }

    pub fn with_status(mut self, active: bool) -> Self {
        self.set_preference(PreferenceKey::ServiceStatus, serde_json::json!(active));
        self
    }

    pub fn set_preference(&mut self, key: PreferenceKey, value: serde_json::Value) {
        self.preferences
            .insert(key.as_str().to_string(), serde_json::to_vec(&value).unwrap());
    }

    /// `None` when the key was never written.
    pub fn persisted_status(&self) -> Option<bool> {
        self.preferences
            .get(PreferenceKey::ServiceStatus.as_str())
            .map(|bytes| decode_value(bytes).unwrap())
    }

    pub fn status_writes(&self) -> Vec<bool> {
        self.writes
            .iter()
            .filter(|(key, _)| key == PreferenceKey::ServiceStatus.as_str())
            .map(|(_, bytes)| decode_value(bytes).unwrap())
            .collect()
    }

    pub fn starts(&self) -> usize {
        self.tracking
            .iter()
            .filter(|op| matches!(op, TrackingOperation::Start { .. }))
            .count()
    }

    pub fn stops(&self) -> usize {
        self.tracking
            .iter()
            .filter(|op| matches!(op, TrackingOperation::Stop { .. }))
            .count()
    }

    pub fn view(&self) -> ViewModel {
        App.view(&self.model)
    }

    /// Sends an event and runs every resulting effect to completion.
    pub fn send(&mut self, event: Event) {
        self.run(VecDeque::from([Work::Event(event)]));
    }

    /// Answers a held store request from the current contents of the store.
    pub fn answer(&mut self, request: Request<KeyValueOperation>) {
        let output = self.handle_kv(&request.operation);
        self.resolve_with(request, output);
    }

    /// Answers a held store request with `output` instead of the current
    /// contents of the store, then runs whatever follows.
    pub fn resolve_with(&mut self, mut request: Request<KeyValueOperation>, output: KeyValueResult) {
        let update = self
            .app
            .resolve(&mut request, output)
            .expect("store request should resolve");
        let mut queue: VecDeque<Work> = update.effects.into_iter().map(Work::Effect).collect();
        queue.extend(update.events.into_iter().map(Work::Event));
        self.run(queue);
    }

    fn run(&mut self, mut queue: VecDeque<Work>) {
        while let Some(work) = queue.pop_front() {
            match work {
                Work::Event(event) => {
                    let update = self.app.update(event, &mut self.model);
                    queue.extend(update.effects.into_iter().map(Work::Effect));
                    queue.extend(update.events.into_iter().map(Work::Event));
                }
                Work::Effect(Effect::Render(_)) => self.renders += 1,
                Work::Effect(Effect::Tracking(request)) => {
                    self.tracking.push(request.operation.clone());
                }
                Work::Effect(Effect::KeyValue(mut request)) => {
                    let output = self.handle_kv(&request.operation);
                    let update = self
                        .app
                        .resolve(&mut request, output)
                        .expect("store request should resolve");
                    queue.extend(update.effects.into_iter().map(Work::Effect));
                    queue.extend(update.events.into_iter().map(Work::Event));
                }
            }
        }
    }

    fn handle_kv(&mut self, operation: &KeyValueOperation) -> KeyValueResult {
        match operation {
            KeyValueOperation::Get { key } => {
                self.reads += 1;
                if self.fail_reads {
                    return KeyValueResult::Err {
                        error: KeyValueError::Io {
                            message: "defaults offline".into(),
                        },
                    };
                }
                KeyValueResult::Ok {
                    response: KeyValueResponse::Get {
                        value: stored(self.preferences.get(key).cloned()),
                    },
                }
            }
            KeyValueOperation::Set { key, value } => {
                self.writes.push((key.clone(), value.clone()));
                let previous = self.preferences.insert(key.clone(), value.clone());
                KeyValueResult::Ok {
                    response: KeyValueResponse::Set {
                        previous: stored(previous),
                    },
                }
            }
            other => panic!("unexpected store operation: {other:?}"),
        }
    }
}

pub fn stored(bytes: Option<Vec<u8>>) -> Value {
    match bytes {
        Some(bytes) => Value::Bytes(bytes),
        None => Value::None,
    }
}

/// The held `KeyValue` requests among `effects`, in order.
pub fn kv_requests(effects: Vec<Effect>) -> Vec<Request<KeyValueOperation>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::KeyValue(request) => Some(request),
            _ => None,
        })
        .collect()
}
