use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const IPV4_ETHER_TYPE: u16 = 0x0800;
pub const ARP_ETHER_TYPE: u16 = 0x0806;
pub const IPV6_ETHER_TYPE: u16 = 0x86DD;
/// Experimental EtherType, so the host stack leaves demo frames alone.
pub const DEMO_ETHER_TYPE: u16 = 0x88B5;

/// 48-bit Ethernet address. Most significant byte is 0th.
#[derive(Eq, Clone, Copy, Hash, PartialEq, PartialOrd, Ord, Default)]
pub struct MacAddr {
    pub bytes: [u8; 6],
}

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr { bytes: [0xff; 6] };
    pub const ZERO: MacAddr = MacAddr { bytes: [0; 6] };

    pub fn new(bytes: [u8; 6]) -> MacAddr {
        MacAddr { bytes }
    }

    /// Copies the first six bytes of `bytes`. Returns `None` if there are fewer than six.
    pub fn from_slice(bytes: &[u8]) -> Option<MacAddr> {
        let mut mac = [0; 6];
        mac.copy_from_slice(bytes.get(0..6)?);
        Some(MacAddr::new(mac))
    }

    pub fn is_broadcast(&self) -> bool {
        *self == MacAddr::BROADCAST
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let b = &self.bytes;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MacAddr({})", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MacParseError {
    #[error("MAC address must be 12 or 17 characters, got {0}")]
    BadLength(usize),
    #[error("invalid hex digit at position {0}")]
    BadDigit(usize),
    #[error("expected ':' at position {0}")]
    MissingSeparator(usize),
}

/// Accepts "aa:bb:cc:dd:ee:ff" or "aabbccddeeff", in either case, with surrounding whitespace.
impl FromStr for MacAddr {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().as_bytes();
        let stride = match text.len() {
            17 => 3,
            12 => 2,
            len => return Err(MacParseError::BadLength(len)),
        };

        let mut bytes = [0u8; 6];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let start = i * stride;
            *byte = hex_pair(text[start], text[start + 1])
                .ok_or(MacParseError::BadDigit(start))?;
            if stride == 3 && i < 5 && text[start + 2] != b':' {
                return Err(MacParseError::MissingSeparator(start + 2));
            }
        }
        Ok(MacAddr::new(bytes))
    }
}

/// Combines two ASCII hex digits into one byte.
pub(crate) fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let hi = (hi as char).to_digit(16)?;
    let lo = (lo as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

/// Protocol carried by an Ethernet II frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EtherType {
    Ipv4,
    Arp,
    Ipv6,
    Demo,
    Other(u16),
}

impl EtherType {
    pub fn label(self) -> &'static str {
        match self {
            EtherType::Ipv4 => "IPv4",
            EtherType::Arp => "ARP",
            EtherType::Ipv6 => "IPv6",
            EtherType::Demo => "DEMO",
            EtherType::Other(_) => "OTHER",
        }
    }
}

impl From<u16> for EtherType {
    fn from(value: u16) -> Self {
        match value {
            IPV4_ETHER_TYPE => EtherType::Ipv4,
            ARP_ETHER_TYPE => EtherType::Arp,
            IPV6_ETHER_TYPE => EtherType::Ipv6,
            DEMO_ETHER_TYPE => EtherType::Demo,
            other => EtherType::Other(other),
        }
    }
}

impl From<EtherType> for u16 {
    fn from(ether_type: EtherType) -> Self {
        match ether_type {
            EtherType::Ipv4 => IPV4_ETHER_TYPE,
            EtherType::Arp => ARP_ETHER_TYPE,
            EtherType::Ipv6 => IPV6_ETHER_TYPE,
            EtherType::Demo => DEMO_ETHER_TYPE,
            EtherType::Other(other) => other,
        }
    }
}
