use crate::commands::{Command, HELP};
use crate::error::Error;
use netgui_packets::hexfile::{self, hex_dump};
use netgui_packets::{ArpMessage, EthernetFrame};
use netgui_runtime::clock::Clock;
use netgui_runtime::{Device, FramePump, InboundEvent, TxError, TxReport};
use std::fs;
use std::net::Ipv4Addr;
use std::path::PathBuf;

/// Payload bytes shown by `last`.
const DUMP_BYTES: usize = 64;

/// Operator-side state: where the custom packet lives and what was last loaded from it.
pub struct Console {
    packet_file: PathBuf,
    probe_target: Ipv4Addr,
    custom: Option<Vec<u8>>,
}

impl Console {
    pub fn new(packet_file: PathBuf, probe_target: Ipv4Addr) -> Self {
        Console {
            packet_file,
            probe_target,
            custom: None,
        }
    }

    /// Creates the packet file from the template if needed and loads it. Problems are reported,
    /// not returned: the pump is useful without a custom packet.
    pub fn prepare(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        match self.ensure_template() {
            Ok(true) => lines.push(format!(
                "[INFO] Created packet template: {}",
                self.packet_file.display()
            )),
            Ok(false) => lines.push(format!(
                "[INFO] Custom packet file exists: {}",
                self.packet_file.display()
            )),
            Err(err) => lines.push(format!("[WARN] {}", err)),
        }
        match self.reload() {
            Ok(len) => lines.push(format!("[INFO] Custom loaded: {} bytes", len)),
            Err(err) => lines.push(format!(
                "[WARN] Custom not loaded ({}): {}",
                self.packet_file.display(),
                err
            )),
        }
        lines
    }

    /// Runs `command` against `pump` and returns what should be shown. `Quit` is the caller's
    /// business and does nothing here.
    pub fn execute<D: Device, C: Clock>(
        &mut self,
        pump: &mut FramePump<D, C>,
        command: Command,
    ) -> Result<Vec<String>, Error> {
        let lines = match command {
            Command::Demo(mode) => {
                let frame = EthernetFrame::demo(pump.config().local_mac, mode);
                let len = frame.to_bytes().len();
                let result = pump.transmit(&frame);
                let fill = if mode == 0 { 0x00 } else { 0xff };
                vec![format!(
                    "[TX] Demo 0x{:02x} ({}B) -> {}",
                    fill,
                    len,
                    tx_status(&result)
                )]
            }
            Command::DemoRx(mode) => {
                let frame = EthernetFrame::demo(pump.config().local_mac, mode);
                let line = format!(
                    "[RX] Demo simulated: {} proto={}",
                    frame.describe(),
                    frame.ether_type().label()
                );
                pump.simulate_rx(frame);
                vec![line]
            }
            Command::Probe(target) => {
                let target = target.unwrap_or(self.probe_target);
                let (request, result) = pump.send_arp_probe(target);
                let summary = ArpMessage::from_frame(&request)
                    .map(|message| message.summary())
                    .unwrap_or_else(|| request.describe());
                vec![format!("[TX] {} -> {}", summary, tx_status(&result))]
            }
            Command::Send => {
                let bytes = self.custom().ok_or(Error::NoCustomPacket)?;
                let result = pump.transmit_raw(bytes);
                vec![format!(
                    "[TX] Custom ({}B) -> {}",
                    bytes.len(),
                    tx_status(&result)
                )]
            }
            Command::Reload => {
                let len = self.reload()?;
                vec![format!("[INFO] [CUSTOM] Reloaded: {} bytes", len)]
            }
            Command::Save => {
                let frame = pump.last_rx().ok_or(Error::NothingReceived)?;
                let description = frame.describe();
                let text = hexfile::render(
                    &frame.to_bytes(),
                    &["Captured from RX", description.as_str()],
                );
                fs::write(&self.packet_file, text)?;
                let len = self.reload()?;
                vec![format!(
                    "[INFO] RX saved as custom and reloaded ({} bytes)",
                    len
                )]
            }
            Command::Template => {
                if self.ensure_template()? {
                    vec![format!(
                        "[INFO] Created packet template: {}",
                        self.packet_file.display()
                    )]
                } else {
                    vec![format!(
                        "[INFO] Custom packet file exists: {}",
                        self.packet_file.display()
                    )]
                }
            }
            Command::Arp => {
                let rows = pump.arp_table();
                if rows.is_empty() {
                    vec!["(empty)".to_string()]
                } else {
                    rows.iter().map(ToString::to_string).collect()
                }
            }
            Command::Last => {
                let mut lines = describe_last("RX", pump.last_rx());
                lines.extend(describe_last("TX", pump.last_tx()));
                lines
            }
            Command::Help => HELP.lines().map(String::from).collect(),
            Command::Quit => Vec::new(),
        };
        Ok(lines)
    }

    /// The loaded custom packet, if any.
    pub fn custom(&self) -> Option<&[u8]> {
        self.custom.as_ref().map(Vec::as_slice)
    }

    fn ensure_template(&self) -> Result<bool, Error> {
        if self.packet_file.exists() {
            return Ok(false);
        }
        fs::write(&self.packet_file, hexfile::TEMPLATE)?;
        Ok(true)
    }

    /// A failed reload forgets the previous packet, so `send` never sends stale bytes.
    fn reload(&mut self) -> Result<usize, Error> {
        self.custom = None;
        let content = fs::read_to_string(&self.packet_file)?;
        let bytes = hexfile::parse(&content)?;
        let len = bytes.len();
        self.custom = Some(bytes);
        Ok(len)
    }
}

/// The line printed for an inbound event, if it is worth one.
pub fn report_event(event: &InboundEvent) -> Option<String> {
    match event {
        InboundEvent::Frame(inbound) => {
            let mut line = format!(
                "[RX] {} proto={}",
                inbound.frame.describe(),
                inbound.frame.ether_type().label()
            );
            if let Some(message) = &inbound.arp {
                line.push_str(&format!(" | {}", message.summary()));
            }
            if let Some(result) = &inbound.reply {
                line.push_str(&format!(" | reply -> {}", tx_status(result)));
            }
            Some(line)
        }
        InboundEvent::RawUnparsed(len) => Some(format!("[RX] {} bytes (raw)", len)),
        InboundEvent::FatalError(reason) => Some(format!("[ERROR] {}", reason)),
        InboundEvent::NoData | InboundEvent::TransientError => None,
    }
}

fn tx_status(result: &Result<TxReport, TxError>) -> String {
    match result {
        Ok(_) => "OK".to_string(),
        Err(err) => format!("ERR ({})", err),
    }
}

fn describe_last(direction: &str, frame: Option<&EthernetFrame>) -> Vec<String> {
    match frame {
        Some(frame) => vec![
            format!(
                "{}: {} proto={}",
                direction,
                frame.describe(),
                frame.ether_type().label()
            ),
            format!("    {}", hex_dump(frame.payload(), DUMP_BYTES)),
        ],
        None => vec![format!("{}: (none)", direction)],
    }
}
