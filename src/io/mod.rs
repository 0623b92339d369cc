pub mod csv;
pub mod json;
pub mod readout;

pub use readout::{velocity_string, Readout};
