//! World-facing contracts shared by the decision engine and the travel graph.
//!
//! The host server owns every creature, player and map. The bot core only
//! sees it through the narrow traits in this crate:
//!
//! - [`WorldOracle`] answers synchronous, possibly-empty world queries
//! - [`Clock`] supplies the millisecond time base used by rate gates
//! - [`ObjectGuid`] and [`WorldPosition`] are the plain values passed across
//!   that boundary
mod clock;
mod guid;
mod oracle;
mod position;

pub use clock::{Clock, ManualClock, SystemClock};
pub use guid::ObjectGuid;
pub use oracle::{EmptyWorld, UnitSnapshot, WorldOracle};
pub use position::WorldPosition;
