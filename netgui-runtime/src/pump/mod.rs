use crate::clock::{Clock, MonotonicClock};
use crate::config::PumpConfig;
use crate::device::{self, Device};
use crate::error::{PumpError, TxError};
use crate::state::{ArpCache, ArpTableRow};
use crossbeam::crossbeam_channel::{self, Receiver, Sender};
use netgui_packets::arp::{self, ArpMessage};
use netgui_packets::EthernetFrame;
use std::io;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

mod outbound;
pub use self::outbound::{Outbound, OutboundFrame};

/// Outcome of a single `FramePump::poll_once`.
#[derive(Debug)]
pub enum InboundEvent {
    /// Nothing arrived before the timeout, or the device returned an empty read.
    NoData,
    Frame(Inbound),
    /// Fewer bytes than an Ethernet header arrived.
    RawUnparsed(usize),
    /// The device would have blocked or the wait was interrupted. Poll again.
    TransientError,
    /// The device failed for good. Every later poll returns this same event.
    FatalError(String),
}

/// A received frame together with what the pump did about it.
#[derive(Debug)]
pub struct Inbound {
    pub frame: EthernetFrame,
    /// Set when the frame carried an Ethernet/IPv4 ARP message.
    pub arp: Option<ArpMessage>,
    /// Set when the frame was an ARP request for our address and an answer was written.
    pub reply: Option<Result<TxReport, TxError>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxReport {
    pub bytes_written: usize,
}

///
/// Owns the device and the ARP cache and moves frames between them.
///
/// The pump is driven from one thread: call `poll_once` with a short timeout, hand the event to
/// whoever displays it, then call `tick` so expired cache entries get swept now and then. Frames
/// from other threads come in through `Outbound` handles and are written by `flush_outbound`.
///
pub struct FramePump<D: Device, C: Clock = MonotonicClock> {
    device: D,
    config: PumpConfig,
    clock: C,
    cache: ArpCache,
    rx_buf: Vec<u8>,
    fatal: Option<String>,
    last_rx: Option<EthernetFrame>,
    last_tx: Option<EthernetFrame>,
    ticks: usize,
    outbound_sender: Sender<OutboundFrame>,
    outbound_receiver: Receiver<OutboundFrame>,
}

impl<D: Device> FramePump<D, MonotonicClock> {
    pub fn new(device: D, config: PumpConfig) -> Self {
        FramePump::with_clock(device, config, MonotonicClock)
    }
}

impl<D: Device, C: Clock> FramePump<D, C> {
    pub fn with_clock(device: D, config: PumpConfig, clock: C) -> Self {
        let (outbound_sender, outbound_receiver) = crossbeam_channel::unbounded();
        FramePump {
            device,
            cache: ArpCache::with_ttls(config.reply_ttl, config.request_ttl),
            rx_buf: vec![0; config.rx_buffer_len],
            config,
            clock,
            fatal: None,
            last_rx: None,
            last_tx: None,
            ticks: 0,
            outbound_sender,
            outbound_receiver,
        }
    }

    ///
    /// Waits up to `timeout` for one frame and reacts to it.
    ///
    /// ARP messages update the cache with the sender's mapping, whatever the opcode. Requests
    /// for `local_ip` are answered right away when `auto_reply` is on, and the result of that
    /// write is returned inside the event.
    ///
    pub fn poll_once(&mut self, timeout: Duration) -> InboundEvent {
        if let Some(reason) = &self.fatal {
            return InboundEvent::FatalError(reason.clone());
        }

        match self.device.poll_readable(timeout) {
            Ok(true) => {}
            Ok(false) => return InboundEvent::NoData,
            Err(err) => return self.device_error("poll", err),
        }

        let len = match self.device.recv(&mut self.rx_buf) {
            Ok(0) => return InboundEvent::NoData,
            Ok(len) => len,
            Err(err) => return self.device_error("read", err),
        };

        match EthernetFrame::from_bytes(&self.rx_buf[..len]) {
            Some(frame) => InboundEvent::Frame(self.on_frame(frame)),
            None => {
                debug!("[RX] {} bytes (raw)", len);
                InboundEvent::RawUnparsed(len)
            }
        }
    }

    /// Encodes `frame`, padding it to the Ethernet minimum, and writes it.
    pub fn transmit(&mut self, frame: &EthernetFrame) -> Result<TxReport, TxError> {
        let result = self.write(&frame.to_bytes());
        log_tx(&tx_summary(frame), &result);
        self.last_tx = Some(frame.clone());
        result
    }

    /// Writes `bytes` exactly as given. Used for hand-written packets, which are not padded.
    pub fn transmit_raw(&mut self, bytes: &[u8]) -> Result<TxReport, TxError> {
        let result = self.write(bytes);
        match EthernetFrame::from_bytes(bytes) {
            Some(frame) => {
                log_tx(&tx_summary(&frame), &result);
                self.last_tx = Some(frame);
            }
            None => log_tx(&format!("{} bytes (raw)", bytes.len()), &result),
        }
        result
    }

    /// Records `frame` as the last received frame without reading the device or reacting to it.
    /// Lets an operator exercise `last`/`save` with nobody on the link.
    pub fn simulate_rx(&mut self, frame: EthernetFrame) {
        info!(
            "[RX] Demo simulated: {} proto={}",
            frame.describe(),
            frame.ether_type().label()
        );
        self.last_rx = Some(frame);
    }

    /// Broadcasts a who-has for `target_ip` and marks it pending in the cache, even when the
    /// write failed.
    pub fn send_arp_probe(
        &mut self,
        target_ip: Ipv4Addr,
    ) -> (EthernetFrame, Result<TxReport, TxError>) {
        let request = arp::make_request(self.config.local_mac, self.config.local_ip, target_ip);
        let result = self.transmit(&request);
        self.cache.record_request_sent(target_ip, self.clock.now());
        info!("[ARP] probing {}", target_ip);
        (request, result)
    }

    /// Counts one loop iteration and sweeps the cache every `sweep_every` of them. Returns how
    /// many entries were removed.
    pub fn tick(&mut self) -> usize {
        if self.config.sweep_every == 0 {
            return 0;
        }
        self.ticks += 1;
        if self.ticks < self.config.sweep_every {
            return 0;
        }
        self.ticks = 0;
        if self.cache.is_empty() {
            return 0;
        }
        self.sweep_now()
    }

    pub fn sweep_now(&mut self) -> usize {
        let removed = self.cache.sweep_expired(self.clock.now());
        if removed > 0 {
            debug!("[ARP] {} entries expired", removed);
        }
        removed
    }

    /// A handle other threads can queue frames on.
    pub fn outbound(&self) -> Outbound {
        Outbound::new(self.outbound_sender.clone())
    }

    /// Writes everything queued through `Outbound` handles, in submission order.
    pub fn flush_outbound(&mut self) -> Vec<Result<TxReport, TxError>> {
        outbound::drain(&self.outbound_receiver)
            .into_iter()
            .map(|queued| match queued {
                OutboundFrame::Frame(frame) => self.transmit(&frame),
                OutboundFrame::Raw(bytes) => self.transmit_raw(&bytes),
            })
            .collect()
    }

    /// Polls until `shutdown` is set or the device fails.
    ///
    /// Each iteration hands the polled event to `on_event`, writes queued outbound frames and
    /// ticks the sweep counter. The flag is checked once per iteration, after the poll returns.
    ///
    /// Outbound writes made by the loop itself are only logged. A callback that needs their
    /// results calls `flush_outbound` itself, which leaves nothing for the loop to write.
    pub fn run<F>(
        &mut self,
        shutdown: &AtomicBool,
        timeout: Duration,
        mut on_event: F,
    ) -> Result<(), PumpError>
    where
        F: FnMut(&mut Self, InboundEvent),
    {
        while !shutdown.load(Ordering::SeqCst) {
            let event = self.poll_once(timeout);
            if let InboundEvent::FatalError(reason) = event {
                return Err(PumpError::Fatal(reason));
            }
            on_event(self, event);
            self.flush_outbound();
            self.tick();
        }
        Ok(())
    }

    pub fn cache(&self) -> &ArpCache {
        &self.cache
    }

    pub fn arp_table(&self) -> Vec<ArpTableRow> {
        self.cache.snapshot(self.clock.now())
    }

    pub fn last_rx(&self) -> Option<&EthernetFrame> {
        self.last_rx.as_ref()
    }

    pub fn last_tx(&self) -> Option<&EthernetFrame> {
        self.last_tx.as_ref()
    }

    pub fn config(&self) -> &PumpConfig {
        &self.config
    }

    /// The reason the pump stopped, once a poll has hit a fatal device error.
    pub fn fatal_reason(&self) -> Option<&str> {
        self.fatal.as_ref().map(String::as_str)
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    fn on_frame(&mut self, frame: EthernetFrame) -> Inbound {
        debug!(
            "[RX] {} proto={}",
            frame.describe(),
            frame.ether_type().label()
        );

        let arp = ArpMessage::from_frame(&frame);
        let mut reply = None;
        if let Some(message) = arp {
            debug!("[RX] {}", message.summary());
            self.cache
                .record_reply(message.sender_ip, message.sender_mac, self.clock.now());
            info!(
                "[ARP] learned {} is-at {}",
                message.sender_ip, message.sender_mac
            );

            if self.config.auto_reply {
                if let Some(answer) =
                    arp::make_reply(&frame, self.config.local_mac, self.config.local_ip)
                {
                    info!("[ARP] answering {}", message.sender_ip);
                    reply = Some(self.transmit(&answer));
                }
            }
        }

        self.last_rx = Some(frame.clone());
        Inbound { frame, arp, reply }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<TxReport, TxError> {
        let written = self.device.send(bytes)?;
        if written != bytes.len() {
            return Err(TxError::Short {
                written,
                expected: bytes.len(),
            });
        }
        Ok(TxReport {
            bytes_written: written,
        })
    }

    fn device_error(&mut self, op: &str, err: io::Error) -> InboundEvent {
        if device::is_transient(&err) {
            trace!("device {} not ready: {}", op, err);
            return InboundEvent::TransientError;
        }
        let reason = format!("device {} failed: {}", op, err);
        error!("{}", reason);
        self.fatal = Some(reason.clone());
        InboundEvent::FatalError(reason)
    }
}

fn tx_summary(frame: &EthernetFrame) -> String {
    match ArpMessage::from_frame(frame) {
        Some(message) => message.summary(),
        None => frame.describe(),
    }
}

fn log_tx(summary: &str, result: &Result<TxReport, TxError>) {
    match result {
        Ok(_) => info!("[TX] {} -> OK", summary),
        Err(err) => warn!("[TX] {} -> ERR ({})", summary, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test::{ManualClock, MockDevice};
    use netgui_packets::{ArpOp, EtherType, MacAddr, MIN_FRAME_LEN};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::thread;

    const LOCAL_MAC: MacAddr = MacAddr {
        bytes: [0x02, 0, 0, 0, 0, 0x01],
    };
    const PEER_MAC: MacAddr = MacAddr {
        bytes: [0x02, 0, 0, 0, 0, 0x09],
    };
    const TIMEOUT: Duration = Duration::from_millis(10);

    fn local_ip() -> Ipv4Addr {
        Ipv4Addr::new(192, 168, 100, 50)
    }

    fn peer_ip() -> Ipv4Addr {
        Ipv4Addr::new(192, 168, 100, 9)
    }

    fn config() -> PumpConfig {
        PumpConfig::new().local_mac(LOCAL_MAC).local_ip(local_ip())
    }

    fn pump_with(
        device: MockDevice,
        config: PumpConfig,
    ) -> (FramePump<MockDevice, ManualClock>, ManualClock) {
        let clock = ManualClock::starting_now();
        (FramePump::with_clock(device, config, clock.clone()), clock)
    }

    fn peer_asks_for(target_ip: Ipv4Addr) -> Vec<u8> {
        arp::make_request(PEER_MAC, peer_ip(), target_ip).to_bytes()
    }

    fn expect_frame(event: InboundEvent) -> Inbound {
        match event {
            InboundEvent::Frame(inbound) => inbound,
            other => panic!("expected a frame, got {:?}", other),
        }
    }

    #[test]
    fn answers_request_for_local_ip() {
        let mut device = MockDevice::new();
        device.push_frame(peer_asks_for(local_ip()));
        let (mut pump, _) = pump_with(device, config());

        let inbound = expect_frame(pump.poll_once(TIMEOUT));
        let request = inbound.arp.unwrap();
        assert_eq!(request.op, ArpOp::Request);
        assert_eq!(request.target_ip, local_ip());
        let report = inbound.reply.unwrap().unwrap();
        assert_eq!(report.bytes_written, MIN_FRAME_LEN);

        let entry = pump.cache().get(peer_ip()).unwrap();
        assert!(entry.resolved);
        assert_eq!(entry.mac, PEER_MAC);

        let sent = pump.device().sent();
        assert_eq!(sent.len(), 1);
        let reply_frame = EthernetFrame::from_bytes(&sent[0]).unwrap();
        assert_eq!(reply_frame.dest_mac(), PEER_MAC);
        assert_eq!(reply_frame.src_mac(), LOCAL_MAC);
        let reply = ArpMessage::from_frame(&reply_frame).unwrap();
        assert_eq!(reply.op, ArpOp::Reply);
        assert_eq!(reply.sender_ip, local_ip());
        assert_eq!(reply.target_mac, PEER_MAC);
        assert_eq!(reply.target_ip, peer_ip());

        assert_eq!(pump.last_rx().unwrap().src_mac(), PEER_MAC);
        assert_eq!(pump.last_tx(), Some(&reply_frame));
    }

    #[test]
    fn learns_from_requests_for_other_hosts_without_replying() {
        let mut device = MockDevice::new();
        device.push_frame(peer_asks_for(Ipv4Addr::new(192, 168, 100, 77)));
        let (mut pump, _) = pump_with(device, config());

        let inbound = expect_frame(pump.poll_once(TIMEOUT));
        assert!(inbound.arp.is_some());
        assert!(inbound.reply.is_none());
        assert!(pump.device().sent().is_empty());
        assert!(pump.cache().get(peer_ip()).unwrap().resolved);
    }

    #[test]
    fn auto_reply_can_be_disabled() {
        let mut device = MockDevice::new();
        device.push_frame(peer_asks_for(local_ip()));
        let (mut pump, _) = pump_with(device, config().auto_reply(false));

        let inbound = expect_frame(pump.poll_once(TIMEOUT));
        assert!(inbound.reply.is_none());
        assert!(pump.device().sent().is_empty());
        assert_eq!(pump.cache().len(), 1);
    }

    #[test]
    fn non_arp_frames_pass_through() {
        let mut device = MockDevice::new();
        device.push_frame(EthernetFrame::demo(LOCAL_MAC, 0).to_bytes());
        let (mut pump, _) = pump_with(device, config());

        let inbound = expect_frame(pump.poll_once(TIMEOUT));
        assert_eq!(inbound.frame.ether_type(), EtherType::Demo);
        assert!(inbound.arp.is_none());
        assert!(inbound.reply.is_none());
        assert!(pump.cache().is_empty());
        assert_eq!(pump.last_rx(), Some(&inbound.frame));
    }

    #[test]
    fn short_reads_are_raw() {
        let mut device = MockDevice::new();
        device.push_frame(vec![0xff; 10]);
        let (mut pump, _) = pump_with(device, config());

        match pump.poll_once(TIMEOUT) {
            InboundEvent::RawUnparsed(10) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(pump.last_rx().is_none());
        assert!(pump.cache().is_empty());
    }

    #[test]
    fn idle_device_has_no_data() {
        let (mut pump, _) = pump_with(MockDevice::new(), config());
        match pump.poll_once(TIMEOUT) {
            InboundEvent::NoData => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn would_block_is_transient() {
        let mut device = MockDevice::new();
        device.push_error(io::ErrorKind::WouldBlock);
        device.push_frame(EthernetFrame::demo(LOCAL_MAC, 1).to_bytes());
        let (mut pump, _) = pump_with(device, config());

        match pump.poll_once(TIMEOUT) {
            InboundEvent::TransientError => {}
            other => panic!("unexpected {:?}", other),
        }
        expect_frame(pump.poll_once(TIMEOUT));
        assert!(pump.fatal_reason().is_none());
    }

    #[test]
    fn fatal_error_is_sticky() {
        let mut device = MockDevice::new();
        device.push_error(io::ErrorKind::BrokenPipe);
        device.push_frame(EthernetFrame::demo(LOCAL_MAC, 1).to_bytes());
        let (mut pump, _) = pump_with(device, config());

        let first = match pump.poll_once(TIMEOUT) {
            InboundEvent::FatalError(reason) => reason,
            other => panic!("unexpected {:?}", other),
        };
        match pump.poll_once(TIMEOUT) {
            InboundEvent::FatalError(reason) => assert_eq!(reason, first),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(pump.device().recv_calls(), 1);
        assert_eq!(pump.device().pending(), 1);
        assert_eq!(pump.fatal_reason(), Some(first.as_str()));
    }

    #[test]
    fn short_write_is_reported_and_pump_continues() {
        let mut device = MockDevice::new();
        device.accept_at_most(20);
        device.push_frame(EthernetFrame::demo(LOCAL_MAC, 0).to_bytes());
        let (mut pump, _) = pump_with(device, config());

        match pump.transmit(&EthernetFrame::demo(LOCAL_MAC, 1)) {
            Err(TxError::Short { written, expected }) => {
                assert_eq!(written, 20);
                assert_eq!(expected, MIN_FRAME_LEN);
            }
            other => panic!("unexpected {:?}", other),
        }
        expect_frame(pump.poll_once(TIMEOUT));
    }

    #[test]
    fn device_write_error_is_reported() {
        let mut device = MockDevice::new();
        device.fail_sends(io::ErrorKind::PermissionDenied);
        let (mut pump, _) = pump_with(device, config());

        match pump.transmit(&EthernetFrame::demo(LOCAL_MAC, 1)) {
            Err(TxError::Device(err)) => {
                assert_eq!(err.kind(), io::ErrorKind::PermissionDenied)
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(pump.fatal_reason().is_none());
    }

    #[test]
    fn raw_transmit_is_not_padded() {
        let (mut pump, _) = pump_with(MockDevice::new(), config());
        let mut bytes = vec![0xff; 6];
        bytes.extend_from_slice(&[0x02, 0, 0, 0, 0, 0x01, 0x88, 0xb5, 0x42]);

        let report = pump.transmit_raw(&bytes).unwrap();
        assert_eq!(report.bytes_written, bytes.len());
        assert_eq!(pump.device().sent()[0], bytes);
        assert_eq!(pump.last_tx().unwrap().payload(), &[0x42]);
    }

    #[test]
    fn probe_creates_pending_entry_that_expires() {
        let (mut pump, clock) = pump_with(MockDevice::new(), config().sweep_every(1));
        let target = Ipv4Addr::new(192, 168, 100, 1);

        let (request, result) = pump.send_arp_probe(target);
        assert!(result.is_ok());
        assert!(request.dest_mac().is_broadcast());
        let message = ArpMessage::from_frame(&request).unwrap();
        assert_eq!(message.op, ArpOp::Request);
        assert_eq!(message.target_ip, target);
        assert_eq!(message.sender_mac, LOCAL_MAC);

        let rows = pump.arp_table();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].resolved);
        assert_eq!(rows[0].ttl_secs, 60);

        clock.advance(Duration::from_secs(61));
        assert_eq!(pump.tick(), 1);
        assert!(pump.arp_table().is_empty());
    }

    #[test]
    fn probe_is_recorded_even_if_the_write_fails() {
        let mut device = MockDevice::new();
        device.fail_sends(io::ErrorKind::Other);
        let (mut pump, _) = pump_with(device, config());

        let (_, result) = pump.send_arp_probe(peer_ip());
        assert!(result.is_err());
        assert!(!pump.cache().get(peer_ip()).unwrap().resolved);
    }

    #[test]
    fn reply_resolves_probe() {
        let (mut pump, clock) = pump_with(MockDevice::new(), config());
        pump.send_arp_probe(peer_ip());

        clock.advance(Duration::from_secs(1));
        let answer = ArpMessage {
            op: ArpOp::Reply,
            sender_mac: PEER_MAC,
            sender_ip: peer_ip(),
            target_mac: LOCAL_MAC,
            target_ip: local_ip(),
        };
        pump.device_mut().push_frame(answer.to_frame(LOCAL_MAC, PEER_MAC).to_bytes());
        let inbound = expect_frame(pump.poll_once(TIMEOUT));
        assert!(inbound.reply.is_none());

        clock.advance(Duration::from_secs(1));
        let rows = pump.arp_table();
        assert!(rows[0].resolved);
        assert_eq!(rows[0].mac, PEER_MAC);
        assert!(rows[0].ttl_secs >= 298 && rows[0].ttl_secs <= 299);
    }

    #[test]
    fn tick_sweeps_on_schedule() {
        let (mut pump, clock) = pump_with(MockDevice::new(), config().sweep_every(3));
        pump.send_arp_probe(peer_ip());
        clock.advance(Duration::from_secs(120));

        assert_eq!(pump.tick(), 0);
        assert_eq!(pump.tick(), 0);
        assert_eq!(pump.cache().len(), 1);
        assert_eq!(pump.tick(), 1);
        assert!(pump.cache().is_empty());
    }

    #[test]
    fn zero_sweep_interval_never_sweeps() {
        let (mut pump, clock) = pump_with(MockDevice::new(), config().sweep_every(0));
        pump.send_arp_probe(peer_ip());
        clock.advance(Duration::from_secs(120));
        for _ in 0..500 {
            assert_eq!(pump.tick(), 0);
        }
        assert_eq!(pump.sweep_now(), 1);
    }

    #[test]
    fn outbound_frames_are_written_in_order() {
        let (mut pump, _) = pump_with(MockDevice::new(), config());
        let outbound = pump.outbound();

        let producer = thread::spawn(move || {
            assert!(outbound.submit(EthernetFrame::demo(LOCAL_MAC, 0)));
            assert!(outbound.submit_raw(vec![1, 2, 3]));
            assert!(outbound.submit(EthernetFrame::demo(LOCAL_MAC, 1)));
        });
        producer.join().unwrap();

        let results = pump.flush_outbound();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.is_ok()));

        let sent = pump.device().sent();
        assert_eq!(sent[0][15], 0x00);
        assert_eq!(sent[1], vec![1, 2, 3]);
        assert_eq!(sent[2][15], 0x01);
        assert!(pump.flush_outbound().is_empty());
    }

    #[test]
    fn outbound_fails_once_pump_is_gone() {
        let (pump, _) = pump_with(MockDevice::new(), config());
        let outbound = pump.outbound();
        drop(pump);
        assert!(!outbound.submit(EthernetFrame::demo(LOCAL_MAC, 0)));
    }

    #[test]
    fn run_stops_on_shutdown() {
        let mut device = MockDevice::new();
        device.push_frame(peer_asks_for(local_ip()));
        device.push_frame(EthernetFrame::demo(LOCAL_MAC, 0).to_bytes());
        let (mut pump, _) = pump_with(device, config());

        let shutdown = Arc::new(AtomicBool::new(false));
        let frames = AtomicUsize::new(0);
        let flag = Arc::clone(&shutdown);
        let result = pump.run(&shutdown, TIMEOUT, |pump, event| {
            if let InboundEvent::Frame(_) = event {
                if frames.fetch_add(1, Ordering::SeqCst) == 0 {
                    pump.outbound().submit(EthernetFrame::demo(LOCAL_MAC, 1));
                } else {
                    flag.store(true, Ordering::SeqCst);
                }
            }
        });

        assert_eq!(result, Ok(()));
        assert_eq!(frames.load(Ordering::SeqCst), 2);
        // The ARP reply, then the demo frame queued from the callback.
        assert_eq!(pump.device().sent().len(), 2);
    }

    #[test]
    fn run_callback_can_collect_outbound_results() {
        let mut device = MockDevice::new();
        device.push_frame(EthernetFrame::demo(LOCAL_MAC, 0).to_bytes());
        device.fail_sends(io::ErrorKind::NetworkDown);
        let (mut pump, _) = pump_with(device, config());

        let shutdown = AtomicBool::new(false);
        let mut failures = Vec::new();
        let result = pump.run(&shutdown, TIMEOUT, |pump, event| {
            if let InboundEvent::Frame(_) = event {
                pump.outbound().submit(EthernetFrame::demo(LOCAL_MAC, 1));
                failures.extend(pump.flush_outbound().into_iter().filter_map(Result::err));
                shutdown.store(true, Ordering::SeqCst);
            }
        });

        assert_eq!(result, Ok(()));
        assert_eq!(failures.len(), 1);
        match &failures[0] {
            TxError::Device(err) => assert_eq!(err.kind(), io::ErrorKind::NetworkDown),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn simulated_rx_only_sets_last_rx() {
        let (mut pump, _) = pump_with(MockDevice::new(), config());
        let frame = EthernetFrame::demo(LOCAL_MAC, 0);
        pump.simulate_rx(frame.clone());

        assert_eq!(pump.last_rx(), Some(&frame));
        assert_eq!(pump.last_tx(), None);
        assert!(pump.device().sent().is_empty());
        assert_eq!(pump.device().recv_calls(), 0);
        assert!(pump.cache().is_empty());
    }

    #[test]
    fn run_returns_fatal_error() {
        let mut device = MockDevice::new();
        device.push_frame(EthernetFrame::demo(LOCAL_MAC, 0).to_bytes());
        device.push_error(io::ErrorKind::NotFound);
        let (mut pump, _) = pump_with(device, config());

        let shutdown = AtomicBool::new(false);
        let mut seen = 0;
        let result = pump.run(&shutdown, TIMEOUT, |_, event| {
            if let InboundEvent::Frame(_) = event {
                seen += 1;
            }
        });

        assert_eq!(seen, 1);
        match result {
            Err(PumpError::Fatal(reason)) => assert!(reason.contains("read")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
