//! IM920 radio module wrappers
//!
//! Typed, owned wrappers over the C-ABI IM920 driver, plus an adapter that
//! presents the radio as a generic addressed stream.

pub mod core;
pub mod driver;
pub mod api;
pub mod utils;

// Re-export commonly used types
pub use crate::core::Packet;
pub use driver::{Driver, Transport, MockDriver, MockRemote, Error, DriverResult};
#[cfg(feature = "native")]
pub use driver::NativeDriver;
pub use api::{DeviceHandle, StreamAdapter, Stream, ReceiveDispatcher, ReceiveHandler};
pub use utils::{AdapterConfig, ConfigError};
