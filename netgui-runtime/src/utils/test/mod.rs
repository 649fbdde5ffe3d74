//! Stand-ins for the device and the clock, so pump behavior can be checked without a TAP
//! interface or real waiting. Enabled for this crate's tests and, through the `test-utils`
//! feature, for integration tests of dependent crates.


pub use self::manual_clock::ManualClock;
pub use self::mock_device::MockDevice;
