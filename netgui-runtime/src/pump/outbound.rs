use crossbeam::crossbeam_channel::{Receiver, Sender};
use netgui_packets::EthernetFrame;

/// What another thread can ask the pump to put on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundFrame {
    /// Encoded (and padded) by the pump before the write.
    Frame(EthernetFrame),
    /// Written exactly as given.
    Raw(Vec<u8>),
}

/// A cloneable handle for queueing frames on a `FramePump` from another thread.
///
/// Frames are only written when the pump's owner calls `FramePump::flush_outbound`, so the device
/// keeps a single writer. Submitting after the pump has been dropped returns `false`.
#[derive(Clone, Debug)]
pub struct Outbound {
    sender: Sender<OutboundFrame>,
}

impl Outbound {
    pub(crate) fn new(sender: Sender<OutboundFrame>) -> Self {
        Outbound { sender }
    }

    pub fn submit(&self, frame: EthernetFrame) -> bool {
        self.sender.send(OutboundFrame::Frame(frame)).is_ok()
    }

    pub fn submit_raw(&self, bytes: Vec<u8>) -> bool {
        self.sender.send(OutboundFrame::Raw(bytes)).is_ok()
    }
}

/// Everything queued so far, oldest first, without waiting for more.
pub(crate) fn drain(receiver: &Receiver<OutboundFrame>) -> Vec<OutboundFrame> {
    receiver.try_iter().collect()
}
