//! # Time units

// Frequency based

/// Hertz
pub type Hertz = fugit::HertzU32;
pub type Hz = Hertz;

/// MegaHertz
pub type MegaHertz = fugit::MegahertzU32;
pub type MHz = MegaHertz;

// Period based

/// Milliseconds
pub type Milliseconds = fugit::MillisDurationU32;

/// Microseconds
pub type Microseconds = fugit::MicrosDurationU32;
