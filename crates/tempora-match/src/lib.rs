//! Temporal collocation of irregularly sampled time series.
//!
//! Pure matching library with no I/O. Aligns candidate observations onto a
//! reference time axis by nearest-neighbor search under a closed tolerance
//! window, with timezone reconciliation, validity-flag masking, and
//! duplicate-timestamp resolution. A deprecated `compat` surface preserves
//! the older windowed-matching contract (fractional-day distances, optional
//! asymmetric window borders).

mod compat;
mod config;
mod duplicates;
mod error;
mod mask;
mod matcher;
mod result;
mod table;
mod timestamp;
mod window;

#[allow(deprecated)]
pub use compat::{AsymWindow, WindowedMatch, WindowedMatchConfig, match_join, windowed_match};
pub use config::{CollocationConfig, temporal_collocation};
pub use error::InputError;
pub use mask::Flag;
pub use result::Collocated;
pub use table::TimeTable;
pub use timestamp::{AsTimeIndex, TimeBasis, TimeIndex, Timestamp, TzKind, resolve_time_basis};
pub use window::Window;
