#[macro_use]
extern crate log;

mod commands;
mod config;
mod console;
mod error;

use commands::{Command, HELP};
use config::Settings;
use console::Console;
use crossbeam::crossbeam_channel::{self, Sender};
use error::Error;
use netgui_runtime::FramePump;
use std::io::{self, BufRead};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tapdev::TapDevice;

const SETUP_HINT: &str = "create the interface first:
  sudo ip tuntap add dev tap0 mode tap user $USER
  sudo ip link set dev tap0 up";

fn main() {
    let matches = config::app().get_matches();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = Settings::from_matches(&matches).and_then(run) {
        error!("{}", err);
        if let Error::Open { .. } = err {
            eprintln!("{}", SETUP_HINT);
        }
        process::exit(1);
    }
}

fn run(settings: Settings) -> Result<(), Error> {
    let mut tap = TapDevice::open(&settings.iface).map_err(|source| Error::Open {
        iface: settings.iface.clone(),
        source,
    })?;
    tap.set_nonblocking(true)?;
    info!(
        "attached to {} as {} / {}",
        tap.name(),
        settings.pump.local_mac,
        settings.pump.local_ip
    );

    let mut console = Console::new(settings.packet_file, settings.probe_target);
    for line in console.prepare() {
        println!("{}", line);
    }
    println!("{}", HELP);

    let mut pump = FramePump::new(tap, settings.pump);
    let shutdown = AtomicBool::new(false);
    let (commands, command_queue) = crossbeam_channel::unbounded();
    thread::spawn(move || read_commands(commands));

    pump.run(&shutdown, settings.poll_interval, |pump, event| {
        if let Some(line) = console::report_event(&event) {
            println!("{}", line);
        }
        for command in command_queue.try_iter() {
            if command == Command::Quit {
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            match console.execute(pump, command) {
                Ok(lines) => lines.iter().for_each(|line| println!("{}", line)),
                Err(err) => warn!("{}", err),
            }
        }
    })?;

    info!("bye");
    Ok(())
}

/// Feeds stdin lines to the pump thread until end of input, which counts as `quit`.
fn read_commands(commands: Sender<Command>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("stdin: {}", err);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(command) => {
                if commands.send(command).is_err() {
                    return;
                }
            }
            Err(err) => {
                warn!("{}", err);
                println!("{}", HELP);
            }
        }
    }
    let _ = commands.send(Command::Quit);
}
