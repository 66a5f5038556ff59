pub mod decode;
pub mod query;

pub use decode::{decode_celsius, decode_field, encode_celsius, FixedPointScale};
pub use query::{query_line, query_point, query_rect, TempStats};
