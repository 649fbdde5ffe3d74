#[macro_use]
extern crate log;

/// The local identity and the knobs of the pump loop. The identity is never global state: it is
/// handed to the pump when it is built.
pub mod config;

/// The device boundary. Anything that can move whole Ethernet frames in and out, with a
/// non-blocking read and a readiness wait, can drive the pump: a TAP interface in production, a
/// scripted mock in tests.
pub mod device;

/// Time source for cache expiry.
pub mod clock;

/// Errors surfaced by transmits and by the pump loop.
pub mod error;

/// Mutable protocol state. Today that is the ARP resolution cache, owned and mutated by the
/// pump alone.
pub mod state;

/// The frame pump: one iteration polls the device, decodes what arrived, lets the ARP layer
/// react (learn the sender, answer requests for our address) and reports the outcome to the
/// caller. Outbound frames from the caller go through the same pump so the device has a single
/// owner.
pub mod pump;

/// Utility module
pub mod utils;

pub use self::config::PumpConfig;
pub use self::device::Device;
pub use self::error::{PumpError, TxError};
pub use self::pump::{FramePump, Inbound, InboundEvent, Outbound, TxReport};
pub use self::state::{ArpCache, ArpEntry, ArpTableRow};
