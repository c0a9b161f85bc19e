//! IM920 as an addressed `Stream`
//!
//! The adapter borrows a `DeviceHandle`, subscribes to its receive callback
//! and re-dispatches every frame to its own subscriber unchanged. Outbound
//! calls and configuration passthroughs use the timeouts from
//! `AdapterConfig` instead of caller-supplied ones.

use crate::api::device::DeviceHandle;
use crate::api::stream::{ReceiveDispatcher, ReceiveHandler, Stream};
use crate::driver::Driver;
use crate::utils::config::AdapterConfig;
use std::sync::Arc;

/// `Stream<u8, u16>` over a borrowed IM920 device
pub struct StreamAdapter<'a, D: Driver> {
    device: &'a mut DeviceHandle<D>,
    config: AdapterConfig,
    receiver: Arc<ReceiveDispatcher<u8, u16>>,
}

impl<'a, D: Driver> StreamAdapter<'a, D> {
    /// Wrap `device`, taking over its receive-callback slot
    pub fn new(device: &'a mut DeviceHandle<D>, config: AdapterConfig) -> Self {
        let receiver: Arc<ReceiveDispatcher<u8, u16>> = Arc::new(ReceiveDispatcher::new());
        let dispatcher = Arc::clone(&receiver);
        device.on_data(move |from, data| {
            dispatcher.dispatch(from, data);
        });

        Self {
            device,
            config,
            receiver,
        }
    }

    pub fn get_node_number(&mut self) -> u16 {
        let timeout = self.config.command_timeout();
        self.device.get_node_number(timeout)
    }

    pub fn set_node_number(&mut self, node_number: u16) -> bool {
        let timeout = self.config.command_timeout();
        self.device.set_node_number(node_number, timeout)
    }

    pub fn get_group_number(&mut self) -> u32 {
        let timeout = self.config.command_timeout();
        self.device.get_group_number(timeout)
    }

    pub fn get_channel(&mut self) -> u8 {
        let timeout = self.config.command_timeout();
        self.device.get_channel(timeout)
    }

    pub fn set_channel(&mut self, channel: u8) -> bool {
        let timeout = self.config.command_timeout();
        self.device.set_channel(channel, timeout)
    }

    pub fn enable_write(&mut self) -> bool {
        let timeout = self.config.command_timeout();
        self.device.enable_write(timeout)
    }

    pub fn get_version(&mut self) -> String {
        let timeout = self.config.command_timeout();
        self.device.get_version(timeout)
    }

    pub fn get_version_bytes(&mut self) -> Vec<u8> {
        let timeout = self.config.command_timeout();
        self.device.get_version_bytes(timeout)
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn device(&self) -> &DeviceHandle<D> {
        &*self.device
    }
}

impl<'a, D: Driver> Stream<u8, u16> for StreamAdapter<'a, D> {
    fn send(&mut self, dest: u16, data: &[u8]) -> bool {
        let timeout = self.config.send_timeout();
        self.device.send(dest, data, timeout)
    }

    fn on_receive(&mut self, handler: ReceiveHandler<u8, u16>) {
        self.receiver.set(handler);
    }
}

impl<'a, D: Driver> Drop for StreamAdapter<'a, D> {
    fn drop(&mut self) {
        self.device.clear_on_data();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Packet;
    use crate::driver::{Call, MockDriver};
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<(u16, Vec<u8>)>>>, ReceiveHandler<u8, u16>) {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&frames);
        let handler: ReceiveHandler<u8, u16> = Box::new(move |from: u16, data: &[u8]| {
            sink.lock().unwrap().push((from, data.to_vec()));
        });
        (frames, handler)
    }

    #[test]
    fn test_frame_is_redispatched() {
        let mock = MockDriver::new();
        let remote = mock.remote();
        let mut device = DeviceHandle::new(mock);
        let mut adapter = StreamAdapter::new(&mut device, AdapterConfig::default());
        let (frames, handler) = recorder();

        adapter.on_receive(handler);
        remote.deliver(0x0010, &[0x01, 0x02, 0x03]);

        assert_eq!(*frames.lock().unwrap(), vec![(0x0010, vec![0x01, 0x02, 0x03])]);
    }

    #[test]
    fn test_frame_before_subscriber_is_dropped() {
        let mock = MockDriver::new();
        let remote = mock.remote();
        let mut device = DeviceHandle::new(mock);
        let mut adapter = StreamAdapter::new(&mut device, AdapterConfig::default());

        remote.deliver(0x0010, &[0x01]);

        let (frames, handler) = recorder();
        adapter.on_receive(handler);
        assert!(frames.lock().unwrap().is_empty());
    }

    #[test]
    fn test_on_receive_replaces_subscriber() {
        let mock = MockDriver::new();
        let remote = mock.remote();
        let mut device = DeviceHandle::new(mock);
        let mut adapter = StreamAdapter::new(&mut device, AdapterConfig::default());
        let (old_frames, old_handler) = recorder();
        let (new_frames, new_handler) = recorder();

        adapter.on_receive(old_handler);
        adapter.on_receive(new_handler);
        remote.deliver(0x0011, &[0x7F]);

        assert!(old_frames.lock().unwrap().is_empty());
        assert_eq!(*new_frames.lock().unwrap(), vec![(0x0011, vec![0x7F])]);
    }

    #[test]
    fn test_send_uses_configured_timeout() {
        let mock = MockDriver::new();
        let remote = mock.remote();
        let mut device = DeviceHandle::new(mock);

        {
            let mut adapter = StreamAdapter::new(&mut device, AdapterConfig::default());
            assert!(adapter.send(0x0020, &[0xAA, 0xBB]));
        }
        {
            let mut adapter = StreamAdapter::new(&mut device, AdapterConfig::low_latency());
            remote.set_transmit_result(false);
            assert!(!adapter.send(0x0020, &[0xAA, 0xBB]));
        }

        let transmits: Vec<Call> = remote
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Transmit { .. }))
            .collect();
        assert_eq!(
            transmits,
            vec![
                Call::Transmit {
                    packet: Packet::new(0x0020, vec![0xAA, 0xBB]),
                    duration_secs: 1.0,
                },
                Call::Transmit {
                    packet: Packet::new(0x0020, vec![0xAA, 0xBB]),
                    duration_secs: 0.05,
                },
            ]
        );
    }

    #[test]
    fn test_passthroughs_use_command_timeout() {
        let mock = MockDriver::new().with_version(Some("VER:01.00"));
        let remote = mock.remote();
        let mut device = DeviceHandle::new(mock);
        let config = AdapterConfig {
            command_timeout_ms: 500,
            ..AdapterConfig::default()
        };
        let mut adapter = StreamAdapter::new(&mut device, config);
        remote.clear_calls();

        assert_eq!(adapter.get_node_number(), 0x0001);
        assert_eq!(adapter.get_group_number(), 0x0102_0304);
        assert_eq!(adapter.get_channel(), 1);
        assert_eq!(adapter.get_version(), "VER:01.00");
        assert_eq!(adapter.get_version_bytes(), b"VER:01.00".to_vec());
        assert!(adapter.enable_write());
        assert!(adapter.set_channel(4));
        assert!(adapter.set_node_number(0x0200));

        assert_eq!(
            remote.calls(),
            vec![
                Call::GetNodeNumber { duration_secs: 0.5 },
                Call::GetGroupNumber { duration_secs: 0.5 },
                Call::GetChannel { duration_secs: 0.5 },
                Call::GetVersion { duration_secs: 0.5 },
                Call::GetVersion { duration_secs: 0.5 },
                Call::EnableWrite { duration_secs: 0.5 },
                Call::SetChannel { channel: 4, duration_secs: 0.5 },
                Call::SetNodeNumber { node_number: 0x0200, duration_secs: 0.5 },
            ]
        );
    }

    #[test]
    fn test_no_hidden_enable_write() {
        let mock = MockDriver::new();
        let remote = mock.remote();
        let mut device = DeviceHandle::new(mock);
        let mut adapter = StreamAdapter::new(&mut device, AdapterConfig::default());

        assert!(!adapter.set_node_number(0x1234));
        assert!(!remote
            .calls()
            .iter()
            .any(|call| matches!(call, Call::EnableWrite { .. })));
        assert_eq!(adapter.get_node_number(), 0x0001);
    }

    #[test]
    fn test_drop_clears_device_handler() {
        let mut device = DeviceHandle::new(MockDriver::new());
        {
            let adapter = StreamAdapter::new(&mut device, AdapterConfig::default());
            assert!(adapter.device().has_data_handler());
        }
        assert!(!device.has_data_handler());
    }

    #[test]
    fn test_adapter_as_trait_object() {
        let mock = MockDriver::new();
        let remote = mock.remote();
        let mut device = DeviceHandle::new(mock);
        let mut adapter = StreamAdapter::new(&mut device, AdapterConfig::default());

        let stream: &mut dyn Stream<u8, u16> = &mut adapter;
        assert!(stream.send(0x0005, b"hi"));
        assert_eq!(remote.transmitted(), vec![Packet::new(0x0005, b"hi".to_vec())]);
    }
}
