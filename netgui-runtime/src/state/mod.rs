mod arp_cache;
pub use self::arp_cache::*;
