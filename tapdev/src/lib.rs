#![cfg(target_os = "linux")]
mod linux;
mod tap;

pub use tap::TapDevice;
