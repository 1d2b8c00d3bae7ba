// lib.rs - shared core for the tracking screen

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod event;
pub mod model;
pub mod reads;
pub mod toggle;
pub mod view;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::{TrackingConfiguration, ValidationError, ValidationFailure};
pub use crux_core::{render::Render, App as CruxApp};
pub use event::Event;
pub use model::Model;
pub use toggle::{ChangeCause, SessionToggle, StateChange, ToggleState};
pub use view::{AlertView, IndicatorView, ViewModel};

pub const MAX_VALUE_SIZE: usize = 64 * 1024;
