//! Addressed stream capability
//!
//! Framework code talks to any transport through `Stream`, so the radio can
//! be swapped for another link without touching callers.

use std::sync::{PoisonError, RwLock};

/// Handler receiving the sender's address and the payload
pub type ReceiveHandler<T, A> = Box<dyn Fn(A, &[T]) + Send + Sync>;

/// Bidirectional, addressed transport
pub trait Stream<T, A> {
    /// Send `data` to `dest`, returning whether the transport accepted it
    fn send(&mut self, dest: A, data: &[T]) -> bool;

    /// Subscribe to inbound data, replacing the previous subscriber
    fn on_receive(&mut self, handler: ReceiveHandler<T, A>);
}

/// Single-subscriber receive slot for `Stream` implementations
pub struct ReceiveDispatcher<T, A> {
    handler: RwLock<Option<ReceiveHandler<T, A>>>,
}

impl<T, A> ReceiveDispatcher<T, A> {
    pub fn new() -> Self {
        Self {
            handler: RwLock::new(None),
        }
    }

    pub fn set(&self, handler: ReceiveHandler<T, A>) {
        *self.handler.write().unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    pub fn clear(&self) {
        *self.handler.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_set(&self) -> bool {
        self.handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Hand inbound data to the subscriber; false if there is none
    pub fn dispatch(&self, from: A, data: &[T]) -> bool {
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

impl<T, A> Default for ReceiveDispatcher<T, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// In-memory stream that hands every send straight back to its subscriber
    struct Loopback {
        own_address: u16,
        receiver: ReceiveDispatcher<u8, u16>,
    }

    impl Stream<u8, u16> for Loopback {
        fn send(&mut self, _dest: u16, data: &[u8]) -> bool {
            self.receiver.dispatch(self.own_address, data)
        }

        fn on_receive(&mut self, handler: ReceiveHandler<u8, u16>) {
            self.receiver.set(handler);
        }
    }

    fn ping(stream: &mut dyn Stream<u8, u16>) -> bool {
        stream.send(0x0001, b"ping")
    }

    #[test]
    fn test_dispatch_without_handler() {
        let dispatcher = ReceiveDispatcher::<u8, u16>::new();
        assert!(!dispatcher.is_set());
        assert!(!dispatcher.dispatch(1, &[1, 2]));
    }

    #[test]
    fn test_dispatch_replace_and_clear() {
        let dispatcher = ReceiveDispatcher::<u8, u16>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        dispatcher.set(Box::new(move |from: u16, _data: &[u8]| first.lock().unwrap().push(("first", from))));
        let second = Arc::clone(&seen);
        dispatcher.set(Box::new(move |from: u16, _data: &[u8]| second.lock().unwrap().push(("second", from))));

        assert!(dispatcher.dispatch(5, &[0]));
        dispatcher.clear();
        assert!(!dispatcher.dispatch(6, &[0]));

        assert_eq!(*seen.lock().unwrap(), vec![("second", 5)]);
    }

    #[test]
    fn test_stream_trait_object() {
        let mut loopback = Loopback {
            own_address: 0x0042,
            receiver: ReceiveDispatcher::new(),
        };
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        loopback.on_receive(Box::new(move |from: u16, data: &[u8]| {
            *sink.lock().unwrap() = Some((from, data.to_vec()));
        }));

        assert!(ping(&mut loopback));
        assert_eq!(*seen.lock().unwrap(), Some((0x0042, b"ping".to_vec())));
    }
}
