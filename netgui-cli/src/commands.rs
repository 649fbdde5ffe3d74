use crate::error::Error;
use std::net::Ipv4Addr;
use std::str::FromStr;

pub const HELP: &str = "commands:
  demo [0|1]    send the demo frame (payload filled with 0x00 or 0xff)
  demo-rx [0|1] pretend the demo frame was just received
  probe [ip]    broadcast an ARP request (default: --probe-target)
  send          send the custom packet file as is
  reload        parse the custom packet file again
  save          store the last received frame as the custom packet
  template      create the custom packet file if it is missing
  arp           show the ARP table
  last          show the last received and sent frames
  help          show this text
  quit          stop (Ctrl-D works too)";

const NAMES: [&str; 11] = [
    "demo", "demo-rx", "probe", "send", "reload", "save", "template", "arp", "last", "help",
    "quit",
];

/// One line typed by the operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Demo(u8),
    DemoRx(u8),
    Probe(Option<Ipv4Addr>),
    Send,
    Reload,
    Save,
    Template,
    Arp,
    Last,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or("").to_ascii_lowercase();
        let argument = words.next();
        if let Some(extra) = words.next() {
            return Err(Error::BadArgument {
                command: name,
                argument: extra.to_string(),
            });
        }

        let command = match (name.as_str(), argument) {
            ("demo", None) | ("demo", Some("0")) => Command::Demo(0),
            ("demo", Some("1")) => Command::Demo(1),
            ("demo-rx", None) | ("demo-rx", Some("0")) => Command::DemoRx(0),
            ("demo-rx", Some("1")) => Command::DemoRx(1),
            ("probe", None) => Command::Probe(None),
            ("probe", Some(ip)) => Command::Probe(Some(ip.parse()?)),
            ("send", None) => Command::Send,
            ("reload", None) => Command::Reload,
            ("save", None) => Command::Save,
            ("template", None) => Command::Template,
            ("arp", None) => Command::Arp,
            ("last", None) => Command::Last,
            ("help", None) | ("?", None) => Command::Help,
            ("quit", None) | ("exit", None) | ("q", None) => Command::Quit,
            (known, Some(argument)) if NAMES.contains(&known) => {
                return Err(Error::BadArgument {
                    command: name.clone(),
                    argument: argument.to_string(),
                })
            }
            _ => return Err(Error::UnknownCommand(name.clone())),
        };
        Ok(command)
    }
}
