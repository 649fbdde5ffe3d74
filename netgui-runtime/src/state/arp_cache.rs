use crate::config::{DEFAULT_REPLY_TTL, DEFAULT_REQUEST_TTL};
use netgui_packets::MacAddr;
use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArpEntry {
    /// Last MAC seen for the address, all-zero if none has been seen yet.
    pub mac: MacAddr,
    pub expires_at: Instant,
    /// False while one of our requests is outstanding.
    pub resolved: bool,
}

/// One line of the table as shown to the operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArpTableRow {
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
    pub ttl_secs: u64,
    pub resolved: bool,
}

impl fmt::Display for ArpTableRow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {} ({}s)", self.ip, self.mac, self.ttl_secs)?;
        if !self.resolved {
            write!(f, " [PEND]")?;
        }
        Ok(())
    }
}

/// IPv4 -> MAC translation table with expiry.
///
/// Entries are keyed by the address as a big-endian `u32`. The cache never looks at a clock
/// itself: every operation takes `now`, and eviction only happens in `sweep_expired`.
pub struct ArpCache {
    entries: HashMap<u32, ArpEntry>,
    reply_ttl: Duration,
    request_ttl: Duration,
}

impl Default for ArpCache {
    fn default() -> Self {
        ArpCache::with_ttls(DEFAULT_REPLY_TTL, DEFAULT_REQUEST_TTL)
    }
}

impl ArpCache {
    /// Creates an empty cache with the default lifetimes (300s learned, 60s pending).
    pub fn new() -> Self {
        ArpCache::default()
    }

    pub fn with_ttls(reply_ttl: Duration, request_ttl: Duration) -> Self {
        ArpCache {
            entries: HashMap::new(),
            reply_ttl,
            request_ttl,
        }
    }

    /// Learns `sender_ip` is at `sender_mac`. Any ARP message carries a usable sender mapping,
    /// requests included, so this is called for both opcodes.
    pub fn record_reply(&mut self, sender_ip: Ipv4Addr, sender_mac: MacAddr, now: Instant) {
        self.entries.insert(
            u32::from(sender_ip),
            ArpEntry {
                mac: sender_mac,
                expires_at: now + self.reply_ttl,
                resolved: true,
            },
        );
    }

    /// Marks `target_ip` as pending after we asked for it. A MAC learned earlier is kept.
    pub fn record_request_sent(&mut self, target_ip: Ipv4Addr, now: Instant) {
        let expires_at = now + self.request_ttl;
        let entry = self
            .entries
            .entry(u32::from(target_ip))
            .or_insert(ArpEntry {
                mac: MacAddr::ZERO,
                expires_at,
                resolved: false,
            });
        entry.expires_at = expires_at;
        entry.resolved = false;
    }

    /// Drops every entry whose expiry is at or before `now`, returning how many went.
    pub fn sweep_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    /// Rows for display, sorted by address.
    pub fn snapshot(&self, now: Instant) -> Vec<ArpTableRow> {
        let mut rows: Vec<(u32, ArpTableRow)> = self
            .entries
            .iter()
            .map(|(key, entry)| {
                (
                    *key,
                    ArpTableRow {
                        ip: Ipv4Addr::from(*key),
                        mac: entry.mac,
                        ttl_secs: entry.expires_at.saturating_duration_since(now).as_secs(),
                        resolved: entry.resolved,
                    },
                )
            })
            .collect();
        rows.sort_by_key(|(key, _)| *key);
        rows.into_iter().map(|(_, row)| row).collect()
    }

    pub fn get(&self, ip: Ipv4Addr) -> Option<&ArpEntry> {
        self.entries.get(&u32::from(ip))
    }

    /// The MAC for `ip`, if it is resolved and has not expired yet.
    pub fn lookup(&self, ip: Ipv4Addr, now: Instant) -> Option<MacAddr> {
        self.get(ip)
            .filter(|entry| entry.resolved && entry.expires_at > now)
            .map(|entry| entry.mac)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
