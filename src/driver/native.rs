//! Native driver backed by the `__ffi_cim920_*` C ABI
//!
//! The build script links the library named by `IM920_LIB_NAME` (default
//! `im920`), searching `IM920_LIB_DIR` first when it is set.

use crate::driver::{CStreamRx, CStreamTx, CTime, DataCallback, Driver, DriverResult, Error, Transport, CIM920};
use std::ffi::{c_char, c_void};
use std::ptr::NonNull;

extern "C" {
    fn __ffi_cim920_new(tx: *mut CStreamTx, rx: *mut CStreamRx, time: *mut CTime) -> *mut CIM920;
    fn __ffi_cim920_on_data(instance: *mut CIM920, cb: DataCallback, ctx: *const c_void);
    fn __ffi_cim920_get_node_number(instance: *mut CIM920, duration_secs: f32) -> u16;
    fn __ffi_cim920_set_node_number(instance: *mut CIM920, node_number: u16, duration_secs: f32) -> bool;
    fn __ffi_cim920_get_group_number(instance: *mut CIM920, duration_secs: f32) -> u32;
    fn __ffi_cim920_get_channel(instance: *mut CIM920, duration_secs: f32) -> u8;
    fn __ffi_cim920_set_channel(instance: *mut CIM920, channel: u8, duration_secs: f32) -> bool;
    fn __ffi_cim920_enable_write(instance: *mut CIM920, duration_secs: f32) -> bool;
    fn __ffi_cim920_get_version(instance: *mut CIM920, duration_secs: f32) -> *mut c_char;
    fn __ffi_cim920_transmit_delegate(
        instance: *mut CIM920,
        dest: u16,
        data: *const u8,
        len: usize,
        duration_secs: f32,
    ) -> bool;
}

/// Driver instance created by the native library
///
/// The library exposes no destroy call, so the instance is never freed from
/// this side.
pub struct NativeDriver {
    instance: NonNull<CIM920>,
}

// The instance is only reached through `&mut self`.
unsafe impl Send for NativeDriver {}

impl NativeDriver {
    pub fn as_ptr(&self) -> *mut CIM920 {
        self.instance.as_ptr()
    }
}

impl Driver for NativeDriver {
    fn open(transport: Transport) -> DriverResult<Self> {
        let instance = unsafe { __ffi_cim920_new(transport.tx(), transport.rx(), transport.time()) };
        let instance = NonNull::new(instance).ok_or(Error::NullHandle)?;
        Ok(Self { instance })
    }

    fn get_node_number(&mut self, duration_secs: f32) -> u16 {
        unsafe { __ffi_cim920_get_node_number(self.as_ptr(), duration_secs) }
    }

    fn set_node_number(&mut self, node_number: u16, duration_secs: f32) -> bool {
        unsafe { __ffi_cim920_set_node_number(self.as_ptr(), node_number, duration_secs) }
    }

    fn get_group_number(&mut self, duration_secs: f32) -> u32 {
        unsafe { __ffi_cim920_get_group_number(self.as_ptr(), duration_secs) }
    }

    fn get_channel(&mut self, duration_secs: f32) -> u8 {
        unsafe { __ffi_cim920_get_channel(self.as_ptr(), duration_secs) }
    }

    fn set_channel(&mut self, channel: u8, duration_secs: f32) -> bool {
        unsafe { __ffi_cim920_set_channel(self.as_ptr(), channel, duration_secs) }
    }

    fn enable_write(&mut self, duration_secs: f32) -> bool {
        unsafe { __ffi_cim920_enable_write(self.as_ptr(), duration_secs) }
    }

    fn get_version(&mut self, duration_secs: f32) -> *const c_char {
        unsafe { __ffi_cim920_get_version(self.as_ptr(), duration_secs) }
    }

    unsafe fn on_data(&mut self, cb: DataCallback, ctx: *const c_void) {
        __ffi_cim920_on_data(self.as_ptr(), cb, ctx)
    }

    unsafe fn transmit_delegate(
        &mut self,
        dest: u16,
        data: *const u8,
        len: usize,
        duration_secs: f32,
    ) -> bool {
        __ffi_cim920_transmit_delegate(self.as_ptr(), dest, data, len, duration_secs)
    }
}
