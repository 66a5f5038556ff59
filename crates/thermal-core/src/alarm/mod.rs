pub mod components;
pub mod highlight;

pub use components::{connected_components, Component, Connectivity, Labeling};
pub use highlight::{apply_alarm, AlarmOptions};
