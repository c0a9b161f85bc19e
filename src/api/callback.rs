//! Receive-callback context and trampoline
//!
//! The driver only knows a plain `extern "C"` function and an untyped context
//! pointer. `CallbackContext` is the heap slot that pointer refers to and
//! `handle_on_data` is the fixed function that turns it back into the typed
//! handler.

use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::slice;
use std::sync::{Arc, PoisonError, RwLock};

/// Handler invoked with the sender's node number and the frame payload
pub type DataHandler = Box<dyn Fn(u16, &[u8]) + Send + Sync>;

/// Single-subscriber handler slot
///
/// Shared between the device handle and the driver. The driver's copy of the
/// pointer is a strong reference that is never released, because the driver
/// gives no signal once it has stopped invoking the callback. A late frame
/// therefore finds an empty slot instead of freed memory.
pub(crate) struct CallbackContext {
    handler: RwLock<Option<DataHandler>>,
}

impl CallbackContext {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            handler: RwLock::new(None),
        })
    }

    /// Context pointer for the driver, owning one strong reference
    pub(crate) fn share_with_driver(context: &Arc<Self>) -> *const c_void {
        Arc::into_raw(Arc::clone(context)) as *const c_void
    }

    /// Swap the stored handler, waiting for any in-flight invocation
    pub(crate) fn replace(&self, handler: Option<DataHandler>) {
        let mut slot = self.handler.write().unwrap_or_else(PoisonError::into_inner);
        *slot = handler;
    }

    pub(crate) fn is_set(&self) -> bool {
        self.handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn invoke(&self, from: u16, data: &[u8]) -> bool {
        let slot = self.handler.read().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(handler) => {
                handler(from, data);
                true
            }
            None => false,
        }
    }
}

/// Trampoline registered with the driver
///
/// A null context means the owning handle has detached. A null buffer is only
/// accepted together with a zero length.
pub(crate) extern "C" fn handle_on_data(ctx: *const c_void, from: u16, data: *const u8, len: usize) {
    if ctx.is_null() {
        return;
    }

    let payload: &[u8] = if len == 0 {
        &[]
    } else if data.is_null() {
        return;
    } else {
        unsafe { slice::from_raw_parts(data, len) }
    };

    let context = unsafe { &*(ctx as *const CallbackContext) };

    // Unwinding out of an extern "C" function aborts the process
    let _ = panic::catch_unwind(AssertUnwindSafe(|| context.invoke(from, payload)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;
    use std::sync::{Arc, Mutex};

    fn recording_context() -> (*const c_void, Arc<CallbackContext>, Arc<Mutex<Vec<(u16, Vec<u8>)>>>) {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&frames);
        let context = CallbackContext::new();
        context.replace(Some(Box::new(move |from: u16, data: &[u8]| {
            sink.lock().unwrap().push((from, data.to_vec()));
        })));
        (CallbackContext::share_with_driver(&context), context, frames)
    }

    #[test]
    fn test_trampoline_recovers_handler() {
        let (ctx, _context, frames) = recording_context();
        let data = [0x01, 0x02, 0x03];

        handle_on_data(ctx, 0x0010, data.as_ptr(), data.len());

        assert_eq!(*frames.lock().unwrap(), vec![(0x0010, vec![0x01, 0x02, 0x03])]);
    }

    #[test]
    fn test_trampoline_null_context() {
        // Must not touch anything
        handle_on_data(ptr::null(), 1, ptr::null(), 4);
    }

    #[test]
    fn test_trampoline_null_buffer() {
        let (ctx, _context, frames) = recording_context();

        handle_on_data(ctx, 2, ptr::null(), 0);
        handle_on_data(ctx, 3, ptr::null(), 8);

        assert_eq!(*frames.lock().unwrap(), vec![(2, Vec::new())]);
    }

    #[test]
    fn test_replace_and_clear() {
        let (ctx, context, frames) = recording_context();
        assert!(context.is_set());

        context.replace(None);
        assert!(!context.is_set());

        handle_on_data(ctx, 4, [9u8].as_ptr(), 1);
        assert!(frames.lock().unwrap().is_empty());
    }

    #[test]
    fn test_panicking_handler_is_contained() {
        let context = CallbackContext::new();
        context.replace(Some(Box::new(|_: u16, _: &[u8]| panic!("handler failure"))));

        handle_on_data(CallbackContext::share_with_driver(&context), 5, [1u8].as_ptr(), 1);
        assert!(context.is_set());
    }

    #[test]
    fn test_driver_reference_outlives_owner() {
        let (ctx, context, frames) = recording_context();
        assert_eq!(Arc::strong_count(&context), 2);

        context.replace(None);
        drop(context);

        // The driver's reference keeps the slot alive; the frame is discarded
        handle_on_data(ctx, 6, [1u8].as_ptr(), 1);
        assert!(frames.lock().unwrap().is_empty());
    }
}
