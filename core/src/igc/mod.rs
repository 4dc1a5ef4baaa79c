//! Reader for the IGC flight-recorder log format.

pub mod parser;
pub mod record;

pub use parser::{parse_igc, parse_igc_str};
pub use record::{decode_degrees, decode_fix, RawFix};
