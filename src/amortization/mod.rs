pub mod engine;
pub mod tracks;

pub use engine::{amortize, AmortizationEngine, AmortizedRow, AmortizedSchedule};
pub use tracks::{build_tracks, Layer, LayerKind, TrackRow, Tracks};
