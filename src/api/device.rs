//! Typed handle over one IM920 driver instance
//!
//! Every call forwards to the driver with the caller's timeout and returns
//! the driver's answer unchanged: `false` for a failed set, `0` for a failed
//! get. Nothing is cached, so each read round-trips to the module.

use crate::api::callback::{handle_on_data, CallbackContext};
use crate::core::Packet;
use crate::driver::{Driver, DriverResult, Transport};
use std::ffi::CStr;
use std::ptr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn, Span};

/// Owned IM920 driver instance with a single receive-callback slot
///
/// The handle is not meant for concurrent use; every operation takes
/// `&mut self` and may block for up to its timeout.
pub struct DeviceHandle<D: Driver> {
    driver: D,
    context: Arc<CallbackContext>,
    registered: bool,
    span: Span,
}

impl<D: Driver> DeviceHandle<D> {
    /// Open a driver instance over the given transport
    pub fn open(transport: Transport) -> DriverResult<Self> {
        Ok(Self::new(D::open(transport)?))
    }

    /// Wrap an already opened driver, logging under an `im920` span
    pub fn new(driver: D) -> Self {
        Self::with_span(driver, tracing::info_span!("im920"))
    }

    /// Wrap an already opened driver, logging under the given span
    pub fn with_span(driver: D, span: Span) -> Self {
        Self {
            driver,
            context: CallbackContext::new(),
            registered: false,
            span,
        }
    }

    pub fn get_node_number(&mut self, timeout: Duration) -> u16 {
        let _enter = self.span.enter();
        let node_number = self.driver.get_node_number(timeout.as_secs_f32());
        debug!(node_number, ?timeout, "get node number");
        node_number
    }

    pub fn set_node_number(&mut self, node_number: u16, timeout: Duration) -> bool {
        let _enter = self.span.enter();
        let ok = self.driver.set_node_number(node_number, timeout.as_secs_f32());
        if ok {
            debug!(node_number, "node number set");
        } else {
            warn!(node_number, ?timeout, "driver rejected node number");
        }
        ok
    }

    pub fn get_group_number(&mut self, timeout: Duration) -> u32 {
        let _enter = self.span.enter();
        let group_number = self.driver.get_group_number(timeout.as_secs_f32());
        debug!(group_number, ?timeout, "get group number");
        group_number
    }

    pub fn get_channel(&mut self, timeout: Duration) -> u8 {
        let _enter = self.span.enter();
        let channel = self.driver.get_channel(timeout.as_secs_f32());
        debug!(channel, ?timeout, "get channel");
        channel
    }

    pub fn set_channel(&mut self, channel: u8, timeout: Duration) -> bool {
        let _enter = self.span.enter();
        let ok = self.driver.set_channel(channel, timeout.as_secs_f32());
        if ok {
            debug!(channel, "channel set");
        } else {
            warn!(channel, ?timeout, "driver rejected channel");
        }
        ok
    }

    /// Unlock configuration writes on the module
    ///
    /// Set calls never do this implicitly.
    pub fn enable_write(&mut self, timeout: Duration) -> bool {
        let _enter = self.span.enter();
        let ok = self.driver.enable_write(timeout.as_secs_f32());
        if !ok {
            warn!(?timeout, "enable write failed");
        }
        ok
    }

    /// Firmware version text, or an empty string if the driver has none
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD, which can
    /// change the length. Use `get_version_bytes` for the exact buffer.
    pub fn get_version(&mut self, timeout: Duration) -> String {
        String::from_utf8_lossy(&self.get_version_bytes(timeout)).into_owned()
    }

    /// Firmware version buffer without the terminator, empty if the driver has none
    pub fn get_version_bytes(&mut self, timeout: Duration) -> Vec<u8> {
        let _enter = self.span.enter();
        let raw = self.driver.get_version(timeout.as_secs_f32());
        if raw.is_null() {
            warn!(?timeout, "no version reported");
            return Vec::new();
        }

        // Copied out before the driver can reuse its buffer
        let version = unsafe { CStr::from_ptr(raw) }.to_bytes().to_vec();
        debug!(len = version.len(), "get version");
        version
    }

    /// Register the receive handler, replacing the previous one
    ///
    /// The handler may run on whatever thread the driver delivers frames
    /// from and must not block.
    pub fn on_data<F>(&mut self, handler: F)
    where
        F: Fn(u16, &[u8]) + Send + Sync + 'static,
    {
        let _enter = self.span.enter();
        self.context.replace(Some(Box::new(handler)));

        if !self.registered {
            let ctx = CallbackContext::share_with_driver(&self.context);
            unsafe { self.driver.on_data(handle_on_data, ctx) };
            self.registered = true;
            debug!("receive callback registered");
        } else {
            debug!("receive handler replaced");
        }
    }

    /// Drop the receive handler; later frames are discarded
    pub fn clear_on_data(&mut self) {
        self.context.replace(None);
    }

    pub fn has_data_handler(&self) -> bool {
        self.context.is_set()
    }

    /// Transmit `data` to node `dest`
    pub fn send(&mut self, dest: u16, data: &[u8], timeout: Duration) -> bool {
        let _enter = self.span.enter();
        let ok = unsafe {
            self.driver
                .transmit_delegate(dest, data.as_ptr(), data.len(), timeout.as_secs_f32())
        };
        if ok {
            debug!(dest, len = data.len(), "frame sent");
        } else {
            warn!(dest, len = data.len(), ?timeout, "transmit failed");
        }
        ok
    }

    pub fn send_packet(&mut self, packet: &Packet, timeout: Duration) -> bool {
        self.send(packet.node_id, &packet.data, timeout)
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl<D: Driver> Drop for DeviceHandle<D> {
    fn drop(&mut self) {
        if self.registered {
            // The trampoline ignores a null context
            unsafe { self.driver.on_data(handle_on_data, ptr::null()) };
        }
        // Waits for a handler that is still running on the driver's thread
        self.context.replace(None);
    }
}
