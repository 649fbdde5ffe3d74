use netgui_packets::hexfile::HexFileError;
use netgui_packets::MacParseError;
use netgui_runtime::PumpError;
use std::io;
use std::net::AddrParseError;
use std::num::ParseIntError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot attach to {iface}: {source}")]
    Open { iface: String, source: io::Error },
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("bad MAC address: {0}")]
    Mac(#[from] MacParseError),
    #[error("bad IPv4 address: {0}")]
    Addr(#[from] AddrParseError),
    #[error("bad number: {0}")]
    Number(#[from] ParseIntError),
    #[error("bad custom packet file: {0}")]
    HexFile(#[from] HexFileError),
    #[error("{0}")]
    Pump(#[from] PumpError),
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("`{command}` does not take `{argument}`")]
    BadArgument { command: String, argument: String },
    #[error("no custom packet loaded")]
    NoCustomPacket,
    #[error("nothing received yet")]
    NothingReceived,
}
