//! Mock IM920 driver for testing and development

use crate::core::Packet;
use crate::driver::{DataCallback, Driver, DriverResult, Transport};
use std::ffi::{c_char, c_void, CString};
use std::ptr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A driver call as recorded by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetNodeNumber { duration_secs: f32 },
    SetNodeNumber { node_number: u16, duration_secs: f32 },
    GetGroupNumber { duration_secs: f32 },
    GetChannel { duration_secs: f32 },
    SetChannel { channel: u8, duration_secs: f32 },
    EnableWrite { duration_secs: f32 },
    GetVersion { duration_secs: f32 },
    OnData { with_context: bool },
    Transmit { packet: Packet, duration_secs: f32 },
    /// Transmit with a null buffer but a non-zero length; always fails
    MalformedTransmit { dest: u16, len: usize, duration_secs: f32 },
}

#[derive(Clone, Copy)]
struct Subscription {
    cb: DataCallback,
    ctx: *const c_void,
}

// The context pointer is only handed back to `cb`; the callback side owns
// its synchronization.
unsafe impl Send for Subscription {}

struct MockState {
    node_number: u16,
    group_number: u32,
    channel: u8,
    version: Option<CString>,
    responsive: bool,
    write_gate: bool,
    write_enabled: bool,
    transmit_result: bool,
    subscription: Option<Subscription>,
    calls: Vec<Call>,
}

impl MockState {
    fn can_write(&self) -> bool {
        self.responsive && (!self.write_gate || self.write_enabled)
    }
}

/// Simulated driver backing
///
/// Values are stable between calls: a get returns whatever was last set.
/// Every call is recorded and can be inspected through a `MockRemote`.
pub struct MockDriver {
    remote: MockRemote,
}

impl MockDriver {
    /// Create a responsive mock with a write gate enabled
    pub fn new() -> Self {
        let state = MockState {
            node_number: 0x0001,
            group_number: 0x0102_0304,
            channel: 1,
            version: CString::new("IM920 MOCK VER:01.00").ok(),
            responsive: true,
            write_gate: true,
            write_enabled: false,
            transmit_result: true,
            subscription: None,
            calls: Vec::new(),
        };

        Self {
            remote: MockRemote {
                shared: Arc::new(Mutex::new(state)),
            },
        }
    }

    pub fn with_node_number(self, node_number: u16) -> Self {
        self.remote.lock().node_number = node_number;
        self
    }

    pub fn with_group_number(self, group_number: u32) -> Self {
        self.remote.lock().group_number = group_number;
        self
    }

    pub fn with_channel(self, channel: u8) -> Self {
        self.remote.lock().channel = channel;
        self
    }

    /// Set the version text; `None` makes the driver report a null buffer
    pub fn with_version(self, version: Option<&str>) -> Self {
        self.remote.set_version(version);
        self
    }

    /// Require `enable_write` before set calls succeed
    pub fn with_write_gate(self, enabled: bool) -> Self {
        self.remote.lock().write_gate = enabled;
        self
    }

    /// Handle for inspecting and driving this mock after it has been moved
    pub fn remote(&self) -> MockRemote {
        self.remote.clone()
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle onto a `MockDriver`'s state
#[derive(Clone)]
pub struct MockRemote {
    shared: Arc<Mutex<MockState>>,
}

impl MockRemote {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulate a module that stops answering within any timeout
    pub fn set_responsive(&self, responsive: bool) {
        self.lock().responsive = responsive;
    }

    /// Result reported for subsequent transmissions
    pub fn set_transmit_result(&self, result: bool) {
        self.lock().transmit_result = result;
    }

    pub fn set_version(&self, version: Option<&str>) {
        self.set_version_bytes(version.map(str::as_bytes));
    }

    /// Set the raw version buffer, which need not be UTF-8
    pub fn set_version_bytes(&self, version: Option<&[u8]>) {
        self.lock().version = version.and_then(|v| CString::new(v).ok());
    }

    pub fn node_number(&self) -> u16 {
        self.lock().node_number
    }

    pub fn channel(&self) -> u8 {
        self.lock().channel
    }

    pub fn is_write_enabled(&self) -> bool {
        self.lock().write_enabled
    }

    /// Whether a callback with a non-null context is registered
    pub fn is_subscribed(&self) -> bool {
        self.lock()
            .subscription
            .map(|sub| !sub.ctx.is_null())
            .unwrap_or(false)
    }

    /// Callback and context currently registered, as the driver would read them
    pub fn registration(&self) -> Option<(DataCallback, *const c_void)> {
        self.lock().subscription.map(|sub| (sub.cb, sub.ctx))
    }

    /// All calls recorded so far
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Packets handed to the transmit call
    pub fn transmitted(&self) -> Vec<Packet> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Transmit { packet, .. } => Some(packet.clone()),
                _ => None,
            })
            .collect()
    }

    /// Push an inbound frame through the registered callback
    ///
    /// Returns false if nothing is registered.
    pub fn deliver(&self, from: u16, data: &[u8]) -> bool {
        unsafe { self.deliver_raw(from, data.as_ptr(), data.len()) }
    }

    /// Push an inbound frame given as a raw pointer and length
    ///
    /// # Safety
    ///
    /// `data` must be null or point to `len` readable bytes.
    pub unsafe fn deliver_raw(&self, from: u16, data: *const u8, len: usize) -> bool {
        // Released before invoking so the callback never runs under the mock's lock
        let subscription = self.lock().subscription;

        match subscription {
            Some(sub) => {
                (sub.cb)(sub.ctx, from, data, len);
                true
            }
            None => false,
        }
    }
}

impl Driver for MockDriver {
    fn open(_transport: Transport) -> DriverResult<Self> {
        Ok(Self::new())
    }

    fn get_node_number(&mut self, duration_secs: f32) -> u16 {
        let mut state = self.remote.lock();
        state.calls.push(Call::GetNodeNumber { duration_secs });
        if state.responsive { state.node_number } else { 0 }
    }

    fn set_node_number(&mut self, node_number: u16, duration_secs: f32) -> bool {
        let mut state = self.remote.lock();
        state.calls.push(Call::SetNodeNumber { node_number, duration_secs });
        if !state.can_write() {
            return false;
        }

        state.node_number = node_number;
        true
    }

    fn get_group_number(&mut self, duration_secs: f32) -> u32 {
        let mut state = self.remote.lock();
        state.calls.push(Call::GetGroupNumber { duration_secs });
        if state.responsive { state.group_number } else { 0 }
    }

    fn get_channel(&mut self, duration_secs: f32) -> u8 {
        let mut state = self.remote.lock();
        state.calls.push(Call::GetChannel { duration_secs });
        if state.responsive { state.channel } else { 0 }
    }

    fn set_channel(&mut self, channel: u8, duration_secs: f32) -> bool {
        let mut state = self.remote.lock();
        state.calls.push(Call::SetChannel { channel, duration_secs });
        if !state.can_write() {
            return false;
        }

        state.channel = channel;
        true
    }

    fn enable_write(&mut self, duration_secs: f32) -> bool {
        let mut state = self.remote.lock();
        state.calls.push(Call::EnableWrite { duration_secs });
        if !state.responsive {
            return false;
        }

        state.write_enabled = true;
        true
    }

    fn get_version(&mut self, duration_secs: f32) -> *const c_char {
        let mut state = self.remote.lock();
        state.calls.push(Call::GetVersion { duration_secs });
        if !state.responsive {
            return ptr::null();
        }

        // The CString lives in the shared state until the version is replaced
        state.version.as_ref().map_or(ptr::null(), |v| v.as_ptr())
    }

    unsafe fn on_data(&mut self, cb: DataCallback, ctx: *const c_void) {
        let mut state = self.remote.lock();
        state.calls.push(Call::OnData { with_context: !ctx.is_null() });
        state.subscription = Some(Subscription { cb, ctx });
    }

    unsafe fn transmit_delegate(
        &mut self,
        dest: u16,
        data: *const u8,
        len: usize,
        duration_secs: f32,
    ) -> bool {
        let bytes = if len == 0 {
            Vec::new()
        } else if data.is_null() {
            self.remote.lock().calls.push(Call::MalformedTransmit { dest, len, duration_secs });
            return false;
        } else {
            std::slice::from_raw_parts(data, len).to_vec()
        };

        let mut state = self.remote.lock();
        state.calls.push(Call::Transmit {
            packet: Packet::new(dest, bytes),
            duration_secs,
        });
        state.responsive && state.transmit_result
    }
}
