//! Driver boundary for the IM920 radio module
//!
//! The native driver is a C-ABI library exporting the `__ffi_cim920_*`
//! functions. The `Driver` trait mirrors that function table one call per
//! method and keeps its raw types, so the wrappers in `crate::api` can run
//! against the real library or against the simulated `MockDriver`.

pub mod error;
pub mod mock;
#[cfg(feature = "native")]
pub mod native;

pub use error::{Error, DriverResult};
pub use mock::{Call, MockDriver, MockRemote};
#[cfg(feature = "native")]
pub use native::NativeDriver;

use std::ffi::{c_char, c_void};
use std::marker::{PhantomData, PhantomPinned};
use std::ptr::NonNull;

/// Receive callback the driver invokes for every inbound frame
pub type DataCallback = extern "C" fn(ctx: *const c_void, from: u16, data: *const u8, len: usize);

macro_rules! opaque_ffi_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(C)]
        pub struct $name {
            _data: [u8; 0],
            _marker: PhantomData<(*mut u8, PhantomPinned)>,
        }
    };
}

opaque_ffi_type!(
    /// Byte sink the driver writes UART traffic into
    CStreamTx
);
opaque_ffi_type!(
    /// Byte source the driver reads UART traffic from
    CStreamRx
);
opaque_ffi_type!(
    /// Time source the driver uses to enforce timeouts
    CTime
);
opaque_ffi_type!(
    /// Native driver instance
    CIM920
);

/// The three transport primitives a driver instance is built from
#[derive(Debug, Clone, Copy)]
pub struct Transport {
    tx: NonNull<CStreamTx>,
    rx: NonNull<CStreamRx>,
    time: NonNull<CTime>,
}

impl Transport {
    /// Bundle raw transport pointers, rejecting null ones
    ///
    /// # Safety
    ///
    /// Non-null pointers must be valid transport objects that outlive every
    /// driver instance opened from this transport.
    pub unsafe fn from_raw(
        tx: *mut CStreamTx,
        rx: *mut CStreamRx,
        time: *mut CTime,
    ) -> DriverResult<Self> {
        Ok(Self {
            tx: NonNull::new(tx).ok_or(Error::NullPointer { argument: "tx" })?,
            rx: NonNull::new(rx).ok_or(Error::NullPointer { argument: "rx" })?,
            time: NonNull::new(time).ok_or(Error::NullPointer { argument: "time" })?,
        })
    }

    pub fn tx(&self) -> *mut CStreamTx {
        self.tx.as_ptr()
    }

    pub fn rx(&self) -> *mut CStreamRx {
        self.rx.as_ptr()
    }

    pub fn time(&self) -> *mut CTime {
        self.time.as_ptr()
    }
}

/// Raw IM920 driver function table
///
/// Timeouts are soft deadlines in seconds enforced inside the driver. Get
/// calls report failure with a zero value, set calls with `false`.
pub trait Driver {
    /// Create a driver instance over the given transport
    fn open(transport: Transport) -> DriverResult<Self>
    where
        Self: Sized;

    fn get_node_number(&mut self, duration_secs: f32) -> u16;

    fn set_node_number(&mut self, node_number: u16, duration_secs: f32) -> bool;

    fn get_group_number(&mut self, duration_secs: f32) -> u32;

    fn get_channel(&mut self, duration_secs: f32) -> u8;

    fn set_channel(&mut self, channel: u8, duration_secs: f32) -> bool;

    /// Unlock configuration writes on the module
    fn enable_write(&mut self, duration_secs: f32) -> bool;

    /// Firmware version text
    ///
    /// Returns a null-terminated buffer owned by the driver that stays valid
    /// until the next call on this instance, or null if the module did not
    /// answer in time.
    fn get_version(&mut self, duration_secs: f32) -> *const c_char;

    /// Register the receive callback, replacing any previous registration
    ///
    /// # Safety
    ///
    /// `ctx` must remain valid for every invocation of `cb`. A driver may
    /// still invoke `cb` with an old `ctx` after a later registration has
    /// replaced it, so the caller keeps `ctx` alive for as long as the
    /// driver could hold it.
    unsafe fn on_data(&mut self, cb: DataCallback, ctx: *const c_void);

    /// Transmit `len` bytes at `data` to node `dest`
    ///
    /// # Safety
    ///
    /// `data` must point to `len` readable bytes for the duration of the call.
    unsafe fn transmit_delegate(
        &mut self,
        dest: u16,
        data: *const u8,
        len: usize,
        duration_secs: f32,
    ) -> bool;
}
