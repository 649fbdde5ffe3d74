use crate::*;

/// Ethernet II header: destination, source, EtherType.
pub const ETHERNET_HEADER_LEN: usize = 14;
/// Smallest frame on the wire, without the FCS the TAP driver never hands us.
pub const MIN_FRAME_LEN: usize = 60;
pub const MIN_PAYLOAD_LEN: usize = MIN_FRAME_LEN - ETHERNET_HEADER_LEN;

const DEST_MAC_RANGE: (usize, usize) = (0, 6);
const SRC_MAC_RANGE: (usize, usize) = (6, 12);
const ETHER_TYPE_RANGE: (usize, usize) = (12, 14);

/// An owned Ethernet II frame.
///
/// Frames are plain values: decoding copies the payload out of the receive buffer, so every
/// holder has its own copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EthernetFrame {
    dest: MacAddr,
    src: MacAddr,
    ether_type: EtherType,
    payload: Vec<u8>,
}

impl EthernetFrame {
    pub fn new(dest: MacAddr, src: MacAddr, ether_type: EtherType, payload: Vec<u8>) -> Self {
        EthernetFrame {
            dest,
            src,
            ether_type,
            payload,
        }
    }

    /// Parses a raw frame as delivered by the device.
    pub fn from_bytes(data: &[u8]) -> Option<EthernetFrame> {
        // 0                    6                    12                      14
        // |---6 byte Dest_MAC--|---6 byte Src_MAC---|--2 Byte EtherType---|
        if data.len() < ETHERNET_HEADER_LEN {
            return None;
        }

        let (dest_start, dest_end) = DEST_MAC_RANGE;
        let (src_start, src_end) = SRC_MAC_RANGE;
        let (type_start, _) = ETHER_TYPE_RANGE;
        let ether_type = u16::from_be_bytes([data[type_start], data[type_start + 1]]);

        Some(EthernetFrame {
            dest: MacAddr::from_slice(&data[dest_start..dest_end])?,
            src: MacAddr::from_slice(&data[src_start..src_end])?,
            ether_type: EtherType::from(ether_type),
            payload: data[ETHERNET_HEADER_LEN..].to_vec(),
        })
    }

    /// Serializes the frame for a device write, zero-padding short payloads so the result is
    /// never shorter than `MIN_FRAME_LEN`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let payload_len = self.payload.len().max(MIN_PAYLOAD_LEN);
        let mut data = Vec::with_capacity(ETHERNET_HEADER_LEN + payload_len);
        data.extend_from_slice(&self.dest.bytes);
        data.extend_from_slice(&self.src.bytes);
        data.extend_from_slice(&u16::from(self.ether_type).to_be_bytes());
        data.extend_from_slice(&self.payload);
        if data.len() < MIN_FRAME_LEN {
            data.resize(MIN_FRAME_LEN, 0);
        }
        data
    }

    /// One-line summary for logs: `src -> dst type=0xXXXX payload=NB`.
    pub fn describe(&self) -> String {
        format!(
            "{} -> {} type=0x{:04x} payload={}B",
            self.src,
            self.dest,
            u16::from(self.ether_type),
            self.payload.len()
        )
    }

    /// The fixed demo frame from `src`: broadcast, EtherType Demo, 46 bytes of `0x00` (mode 0)
    /// or `0xff` (any other mode) behind a `0x42, mode` marker.
    pub fn demo(src: MacAddr, mode: u8) -> EthernetFrame {
        let fill = if mode == 0 { 0x00 } else { 0xff };
        let mut payload = vec![fill; MIN_PAYLOAD_LEN];
        payload[0] = 0x42;
        payload[1] = mode;
        EthernetFrame::new(
            MacAddr::BROADCAST,
            src,
            EtherType::Demo,
            payload,
        )
    }

    pub fn dest_mac(&self) -> MacAddr {
        self.dest
    }

    pub fn src_mac(&self) -> MacAddr {
        self.src
    }

    pub fn ether_type(&self) -> EtherType {
        self.ether_type
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}
