//! Wrappers over the IM920 driver
//!
//! `DeviceHandle` exposes the driver as typed, owned calls with a single
//! receive-callback slot. `StreamAdapter` presents a borrowed device as a
//! generic addressed `Stream`.

pub mod adapter;
pub mod callback;
pub mod device;
pub mod stream;

pub use adapter::StreamAdapter;
pub use callback::DataHandler;
pub use device::DeviceHandle;
pub use stream::{ReceiveDispatcher, ReceiveHandler, Stream};
