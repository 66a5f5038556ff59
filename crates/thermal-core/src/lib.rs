pub mod consts;
pub mod error;
pub mod frame;
pub mod header;
pub mod temperature;
pub mod calibration;
pub mod color;
pub mod alarm;
pub mod orient;
pub mod pipeline;
pub mod io;
