pub mod capture;
pub mod image_io;
