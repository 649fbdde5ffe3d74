#![deny(missing_docs)]

use crate::linux;
use libc;
use netgui_runtime::Device;
use std::{
    ffi::CStr,
    io,
    mem::MaybeUninit,
    os::unix::io::{AsRawFd, RawFd},
    time::Duration,
};

/// An attached Linux TAP interface. Each read yields one Ethernet frame and each write sends one,
/// with no packet-information header in front.
///
/// The interface itself must already exist and be up, e.g.
/// `ip tuntap add dev tap0 mode tap user $USER` followed by `ip link set dev tap0 up`.
#[derive(Debug)]
pub struct TapDevice {
    fd: libc::c_int,
    name: String,
}

impl TapDevice {
    /// Attaches to the TAP interface called `name`. An empty name lets the kernel pick one; the
    /// name actually used is available from `name()`.
    pub fn open(name: &str) -> io::Result<Self> {
        let requested = interface_name(name)?;

        // This block must be marked as unsafe because it uses FFI with C code. It passes a
        // NUL-terminated static path and does not touch Rust-owned memory.
        let fd = unsafe {
            // Resources:
            // https://www.kernel.org/doc/Documentation/networking/tuntap.txt
            let fd = libc::open(
                linux::TUN_CLONE_DEVICE.as_ptr() as *const libc::c_char,
                libc::O_RDWR | libc::O_CLOEXEC,
            );
            if fd < 0 {
                return Err(io::Error::last_os_error());
            }
            fd
        };
        // From here on `Drop` closes the descriptor if attaching fails.
        let mut device = TapDevice {
            fd,
            name: String::new(),
        };

        // This block is marked as unsafe because it uses FFI. The ifreq is zeroed before use, the
        // name copied into it is NUL-terminated (checked by `interface_name`), and the kernel
        // writes back at most IFNAMSIZ bytes of name.
        device.name = unsafe {
            let mut ifr: linux::ifreq = MaybeUninit::zeroed().assume_init();
            ifr.ifr_ifrn.ifrn_name = requested;
            ifr.ifr_ifru.ifru_flags = linux::IFF_TAP | linux::IFF_NO_PI;
            // ioctl(TUNSETIFF) attaches this descriptor to the interface and fills in its name.
            let err = libc::ioctl(device.fd, linux::TUNSETIFF, &mut ifr);
            if err < 0 {
                return Err(io::Error::last_os_error());
            }
            CStr::from_ptr(ifr.ifr_ifrn.ifrn_name.as_ptr())
                .to_string_lossy()
                .into_owned()
        };
        Ok(device)
    }

    /// Name of the attached interface.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configures the device's non-blocking status.
    pub fn set_nonblocking(&mut self, nonblocking: bool) -> io::Result<()> {
        // This block is marked as unsafe because it uses FFI, however, we assume this code to be
        // safe because we handle fcntl's failures properly. Additionally, we do not borrow any
        // Rust-owned memory.
        // Resources used to write syscall code:
        // https://beej.us/guide/bgnet/html/multi/advanced.html#blocking
        // man 2 fcntl
        unsafe {
            let flags = libc::fcntl(self.fd, libc::F_GETFL);
            if flags < 0 {
                return Err(io::Error::last_os_error());
            }
            let new_flags = if nonblocking {
                flags | libc::O_NONBLOCK
            } else {
                flags & (!libc::O_NONBLOCK)
            };
            let err = libc::fcntl(self.fd, libc::F_SETFL, new_flags);
            if err < 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }

    /// Returns true if the device is configured not to block, false otherwise.
    pub fn is_nonblocking(&self) -> io::Result<bool> {
        // See comments on block above (in set_nonblocking).
        let flags = unsafe {
            let flags = libc::fcntl(self.fd, libc::F_GETFL);
            if flags < 0 {
                return Err(io::Error::last_os_error());
            }
            flags
        };
        Ok(flags & libc::O_NONBLOCK == libc::O_NONBLOCK)
    }

    /// Waits up to `timeout` for a frame to become readable.
    pub fn wait_readable(&self, timeout: Duration) -> io::Result<bool> {
        let millis = timeout.as_millis().min(libc::c_int::max_value() as u128) as libc::c_int;
        let mut pfd = libc::pollfd {
            fd: self.fd,
            events: libc::POLLIN,
            revents: 0,
        };
        // This block is marked as unsafe because it uses FFI. `pfd` is a single pollfd that lives
        // for the duration of the call.
        // Resources:
        // man 2 poll
        let ready = unsafe { libc::poll(&mut pfd, 1, millis) };
        if ready < 0 {
            return Err(io::Error::last_os_error());
        }
        // POLLERR and friends also count: the following read reports the actual error.
        Ok(ready > 0 && pfd.revents != 0)
    }

    /// Reads one frame. A frame longer than `frame` is truncated.
    pub fn recv(&mut self, frame: &mut [u8]) -> io::Result<usize> {
        // This block is marked as unsafe because it uses FFI. It mutably borrows the Rust-owned
        // buffer and passes its exact length, so the kernel cannot write past it.
        let bytes = unsafe { libc::read(self.fd, frame.as_mut_ptr() as *mut _, frame.len()) };
        if bytes < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(bytes as usize)
        }
    }

    /// Writes one frame.
    pub fn send(&mut self, frame: &[u8]) -> io::Result<usize> {
        // Note comment in `recv` call.
        let bytes = unsafe { libc::write(self.fd, frame.as_ptr() as *const _, frame.len()) };
        if bytes < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(bytes as usize)
        }
    }
}

impl Device for TapDevice {
    fn poll_readable(&mut self, timeout: Duration) -> io::Result<bool> {
        self.wait_readable(timeout)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        TapDevice::recv(self, buf)
    }

    fn send(&mut self, frame: &[u8]) -> io::Result<usize> {
        TapDevice::send(self, frame)
    }
}

impl AsRawFd for TapDevice {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Drop for TapDevice {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

/// Checks `name` fits in an ifreq with its terminating NUL and converts it.
fn interface_name(name: &str) -> io::Result<[libc::c_char; libc::IFNAMSIZ]> {
    let bytes = name.as_bytes();
    if bytes.len() >= libc::IFNAMSIZ || bytes.contains(&0) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("`{}` is not a valid interface name", name),
        ));
    }
    let mut out = [0 as libc::c_char; libc::IFNAMSIZ];
    for (dst, src) in out.iter_mut().zip(bytes) {
        *dst = *src as libc::c_char;
    }
    Ok(out)
}
