mod types;
pub use self::types::*;

mod ethernet;
pub use self::ethernet::*;

pub mod arp;
pub use self::arp::{ArpMessage, ArpOp};

/// Loader/writer for the "hex bytes" text format custom packets are authored in.
pub mod hexfile;
