use netgui_packets::MacAddr;
use std::net::Ipv4Addr;
use std::time::Duration;

pub const DEFAULT_LOCAL_MAC: MacAddr = MacAddr {
    bytes: [0x02, 0x00, 0x00, 0x00, 0x00, 0x01],
};
pub const DEFAULT_LOCAL_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 100, 50);
pub const DEFAULT_REPLY_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_REQUEST_TTL: Duration = Duration::from_secs(60);
/// Larger than any frame a TAP device with a standard MTU will deliver.
pub const DEFAULT_RX_BUFFER_LEN: usize = 2048;
pub const DEFAULT_SWEEP_EVERY: usize = 200;

/// Settings a `FramePump` is built with.
#[derive(Clone, Debug, PartialEq)]
pub struct PumpConfig {
    /// MAC we answer ARP with and source probes from.
    pub local_mac: MacAddr,
    /// IPv4 address we answer ARP requests for.
    pub local_ip: Ipv4Addr,
    /// Lifetime of a mapping learned from any ARP message.
    pub reply_ttl: Duration,
    /// Lifetime of a pending entry created by a probe.
    pub request_ttl: Duration,
    pub rx_buffer_len: usize,
    /// The cache is swept once every this many calls to `FramePump::tick`. Zero disables sweeping.
    pub sweep_every: usize,
    /// Whether ARP requests for `local_ip` are answered automatically.
    pub auto_reply: bool,
}

impl Default for PumpConfig {
    fn default() -> Self {
        PumpConfig {
            local_mac: DEFAULT_LOCAL_MAC,
            local_ip: DEFAULT_LOCAL_IP,
            reply_ttl: DEFAULT_REPLY_TTL,
            request_ttl: DEFAULT_REQUEST_TTL,
            rx_buffer_len: DEFAULT_RX_BUFFER_LEN,
            sweep_every: DEFAULT_SWEEP_EVERY,
            auto_reply: true,
        }
    }
}

impl PumpConfig {
    pub fn new() -> Self {
        PumpConfig::default()
    }

    pub fn local_mac(self, local_mac: MacAddr) -> Self {
        PumpConfig { local_mac, ..self }
    }

    pub fn local_ip(self, local_ip: Ipv4Addr) -> Self {
        PumpConfig { local_ip, ..self }
    }

    pub fn reply_ttl(self, reply_ttl: Duration) -> Self {
        PumpConfig { reply_ttl, ..self }
    }

    pub fn request_ttl(self, request_ttl: Duration) -> Self {
        PumpConfig {
            request_ttl,
            ..self
        }
    }

    pub fn rx_buffer_len(self, rx_buffer_len: usize) -> Self {
        PumpConfig {
            rx_buffer_len,
            ..self
        }
    }

    pub fn sweep_every(self, sweep_every: usize) -> Self {
        PumpConfig {
            sweep_every,
            ..self
        }
    }

    pub fn auto_reply(self, auto_reply: bool) -> Self {
        PumpConfig { auto_reply, ..self }
    }
}
