pub mod correct;
pub mod table;

pub use correct::{correct, corrector, CorrectionParams};
pub use table::{CalibrationStore, CalibrationTable, ProductFamily, TransmissionGrid};
