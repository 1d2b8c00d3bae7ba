mod kv;
mod tracking;

pub use self::kv::{
    decode_value, encode_value, KvCapability, KvError, KvReadResult, KvWriteResult,
    PreferenceKey,
};
pub use self::tracking::{SessionId, Tracking, TrackingOperation};

// Crux's built-in Render covers view updates; no wrapper needed.
pub use crux_core::render::Render;
pub use crux_kv::KeyValue;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub render: Render<Event>,
    pub kv: KeyValue<Event>,
    pub tracking: Tracking<Event>,
}
