pub mod config;
pub mod dom;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod store;

// Orb engine: rotation, radial layout, shell, hub bridge
pub mod orb;

pub use config::{NavAction, NavItemConfig, OrbConfig};
pub use error::{OrbError, Result};
pub use events::{BusEvent, EventBus, HubState, ProfileHub};
pub use orb::{FloatingOrb, OrbAction, OrbContext};
