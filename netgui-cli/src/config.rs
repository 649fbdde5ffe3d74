use crate::error::Error;
use clap::{App, Arg, ArgMatches};
use netgui_runtime::PumpConfig;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

/// Everything the command line decides.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub iface: String,
    pub pump: PumpConfig,
    pub probe_target: Ipv4Addr,
    pub packet_file: PathBuf,
    pub poll_interval: Duration,
}

pub fn app() -> App<'static, 'static> {
    App::new("netgui")
        .version("0.1")
        .author("netgui contributors")
        .about("Watch and inject Ethernet and ARP frames on a TAP interface")
        .arg(
            Arg::with_name("iface")
                .short("i")
                .long("iface")
                .value_name("NAME")
                .help("TAP interface to attach to")
                .default_value("tap0")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("mac")
                .short("m")
                .long("mac")
                .value_name("MAC")
                .help("Local MAC address used for ARP")
                .default_value("02:00:00:00:00:01")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("ip")
                .short("a")
                .long("ip")
                .value_name("IPV4")
                .help("Local IPv4 address answered for in ARP")
                .default_value("192.168.100.50")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("probe_target")
                .short("t")
                .long("probe-target")
                .value_name("IPV4")
                .help("Address `probe` asks for when given none")
                .default_value("192.168.100.1")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("packet_file")
                .short("f")
                .long("packet-file")
                .value_name("FILE")
                .help("Custom packet file, hex bytes")
                .default_value("custom_packet.hex")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("poll_ms")
                .short("p")
                .long("poll-ms")
                .value_name("MILLIS")
                .help("How long one poll waits for a frame")
                .default_value("10")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("no_auto_reply")
                .long("no-auto-reply")
                .help("Do not answer ARP requests for the local address"),
        )
}

impl Settings {
    pub fn from_matches(matches: &ArgMatches) -> Result<Settings, Error> {
        // Every argument that takes a value has a default.
        let value = |name: &str| matches.value_of(name).unwrap_or_default();

        let pump = PumpConfig::new()
            .local_mac(value("mac").parse()?)
            .local_ip(value("ip").parse()?)
            .auto_reply(!matches.is_present("no_auto_reply"));

        Ok(Settings {
            iface: value("iface").to_string(),
            pump,
            probe_target: value("probe_target").parse()?,
            packet_file: PathBuf::from(value("packet_file")),
            poll_interval: Duration::from_millis(value("poll_ms").parse()?),
        })
    }
}
