//! ARP (RFC 826) for IPv4 over Ethernet.
//!
//! Encoding and decoding here is stateless: correlating a request we sent with the reply that
//! answers it is the resolution cache's job.

use crate::{EtherType, EthernetFrame, MacAddr, IPV4_ETHER_TYPE};
use std::net::Ipv4Addr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArpOp {
    Request = 1,
    Reply = 2,
}

impl ArpOp {
    pub fn from_u16(code: u16) -> Option<ArpOp> {
        match code {
            1 => Some(ArpOp::Request),
            2 => Some(ArpOp::Reply),
            _ => None,
        }
    }
}

pub enum ArpHardwareType {
    Ethernet = 1,
}

/// Fixed part of the ARP header, before the variable-length addresses.
pub const ARP_HEADER_LEN: usize = 8;
/// Header plus sender and target Ethernet/IPv4 address pairs.
pub const ARP_IPV4_PAYLOAD_LEN: usize = ARP_HEADER_LEN + 2 * (6 + 4);

const HARDWARE_TYPE_RANGE: (usize, usize) = (0, 2);
const PROTOCOL_TYPE_RANGE: (usize, usize) = (2, 4);
const HARDWARE_ADDR_LEN_OFFSET: usize = 4;
const PROTOCOL_ADDR_LEN_OFFSET: usize = 5;
const OPCODE_RANGE: (usize, usize) = (6, 8);

/// A decoded IPv4-over-Ethernet ARP message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArpMessage {
    pub op: ArpOp,
    pub sender_mac: MacAddr,
    pub sender_ip: Ipv4Addr,
    pub target_mac: MacAddr,
    pub target_ip: Ipv4Addr,
}

impl ArpMessage {
    ///
    /// Decodes the ARP message carried by `frame`.
    ///
    /// Returns `None` for anything that is not Ethernet/IPv4 ARP with a known opcode: wrong
    /// EtherType, truncated payloads, other hardware or protocol types, and other address
    /// lengths are all "not for us" rather than errors.
    ///
    pub fn from_frame(frame: &EthernetFrame) -> Option<ArpMessage> {
        if frame.ether_type() != EtherType::Arp {
            return None;
        }
        ArpMessage::from_payload(frame.payload())
    }

    /// Decodes an ARP payload, trailing padding allowed.
    pub fn from_payload(payload: &[u8]) -> Option<ArpMessage> {
        if payload.len() < ARP_HEADER_LEN {
            return None;
        }

        let hardware_type = be_u16(payload, HARDWARE_TYPE_RANGE)?;
        let protocol_type = be_u16(payload, PROTOCOL_TYPE_RANGE)?;
        if hardware_type != ArpHardwareType::Ethernet as u16 || protocol_type != IPV4_ETHER_TYPE {
            return None;
        }

        let hlen = *payload.get(HARDWARE_ADDR_LEN_OFFSET)? as usize;
        let plen = *payload.get(PROTOCOL_ADDR_LEN_OFFSET)? as usize;
        if hlen != 6 || plen != 4 {
            return None;
        }
        if payload.len() < ARP_IPV4_PAYLOAD_LEN {
            return None;
        }

        let op = ArpOp::from_u16(be_u16(payload, OPCODE_RANGE)?)?;
        let (sha_start, sha_end) = sender_hardware_addr_range(hlen);
        let (spa_start, spa_end) = sender_protocol_addr_range(hlen, plen);
        let (tha_start, tha_end) = target_hardware_addr_range(hlen, plen);
        let (tpa_start, tpa_end) = target_protocol_addr_range(hlen, plen);

        Some(ArpMessage {
            op,
            sender_mac: MacAddr::from_slice(payload.get(sha_start..sha_end)?)?,
            sender_ip: ipv4_at(payload.get(spa_start..spa_end)?)?,
            target_mac: MacAddr::from_slice(payload.get(tha_start..tha_end)?)?,
            target_ip: ipv4_at(payload.get(tpa_start..tpa_end)?)?,
        })
    }

    /// Encodes the 28-byte ARP payload.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(ARP_IPV4_PAYLOAD_LEN);
        payload.extend_from_slice(&(ArpHardwareType::Ethernet as u16).to_be_bytes());
        payload.extend_from_slice(&IPV4_ETHER_TYPE.to_be_bytes());
        payload.push(6);
        payload.push(4);
        payload.extend_from_slice(&(self.op as u16).to_be_bytes());
        payload.extend_from_slice(&self.sender_mac.bytes);
        payload.extend_from_slice(&self.sender_ip.octets());
        payload.extend_from_slice(&self.target_mac.bytes);
        payload.extend_from_slice(&self.target_ip.octets());
        payload
    }

    /// Wraps the message in an ARP-typed Ethernet frame.
    pub fn to_frame(&self, dest: MacAddr, src: MacAddr) -> EthernetFrame {
        EthernetFrame::new(dest, src, EtherType::Arp, self.to_payload())
    }

    /// Operator-facing text, e.g. `ARP Request: who-has 10.0.0.1 tell 10.0.0.2`.
    pub fn summary(&self) -> String {
        match self.op {
            ArpOp::Request => format!(
                "ARP Request: who-has {} tell {}",
                self.target_ip, self.sender_ip
            ),
            ArpOp::Reply => format!("ARP Reply: {} is-at {}", self.sender_ip, self.sender_mac),
        }
    }
}

///
/// Builds a broadcast who-has for `target_ip`.
///
/// Target Hardware Address is left all-zero, since it is the value being resolved.
///
pub fn make_request(local_mac: MacAddr, local_ip: Ipv4Addr, target_ip: Ipv4Addr) -> EthernetFrame {
    ArpMessage {
        op: ArpOp::Request,
        sender_mac: local_mac,
        sender_ip: local_ip,
        target_mac: MacAddr::ZERO,
        target_ip,
    }
    .to_frame(MacAddr::BROADCAST, local_mac)
}

///
/// Answers `frame` if it is an ARP request for `local_ip`.
///
/// From the RFC: swap hardware and protocol fields, putting the local hardware and protocol
/// addresses in the sender fields, set the opcode to reply, and send it to the (new) target
/// hardware address.
///
pub fn make_reply(
    frame: &EthernetFrame,
    local_mac: MacAddr,
    local_ip: Ipv4Addr,
) -> Option<EthernetFrame> {
    let request = ArpMessage::from_frame(frame)?;
    if request.op != ArpOp::Request || request.target_ip != local_ip {
        return None;
    }

    let reply = ArpMessage {
        op: ArpOp::Reply,
        sender_mac: local_mac,
        sender_ip: local_ip,
        target_mac: request.sender_mac,
        target_ip: request.sender_ip,
    };
    Some(reply.to_frame(request.sender_mac, local_mac))
}

fn be_u16(payload: &[u8], range: (usize, usize)) -> Option<u16> {
    let (start, end) = range;
    match payload.get(start..end)? {
        [hi, lo] => Some(u16::from_be_bytes([*hi, *lo])),
        _ => None,
    }
}

fn ipv4_at(bytes: &[u8]) -> Option<Ipv4Addr> {
    match bytes {
        [a, b, c, d] => Some(Ipv4Addr::new(*a, *b, *c, *d)),
        _ => None,
    }
}

fn sender_hardware_addr_range(hlen: usize) -> (usize, usize) {
    let start = ARP_HEADER_LEN;
    (start, start + hlen)
}

fn sender_protocol_addr_range(hlen: usize, plen: usize) -> (usize, usize) {
    let start = ARP_HEADER_LEN + hlen;
    (start, start + plen)
}

fn target_hardware_addr_range(hlen: usize, plen: usize) -> (usize, usize) {
    let start = ARP_HEADER_LEN + hlen + plen;
    (start, start + hlen)
}

fn target_protocol_addr_range(hlen: usize, plen: usize) -> (usize, usize) {
    let start = ARP_HEADER_LEN + (2 * hlen) + plen;
    (start, start + plen)
}
