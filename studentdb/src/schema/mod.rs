// Field constraints and enumerations of the student record

mod types;

pub use types::*;
