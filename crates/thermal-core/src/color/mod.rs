pub mod bar;
pub mod gradient;
pub mod palette;
pub mod render;

pub use bar::color_bar;
pub use gradient::{argb_to_rgba, sample_stops};
pub use palette::StandardPalette;
pub use render::{render_rgba, ColorSource, DisplayRange, RenderMode, RenderOptions};
