//! Stream adapter demonstration
//!
//! Drives a `StreamAdapter` against the simulated driver: configuration
//! reads, a gated write, a transmission and an inbound frame.

use im920_com::{AdapterConfig, DeviceHandle, MockDriver, Stream, StreamAdapter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== IM920 Stream Adapter Demo ===\n");

    let mock = MockDriver::new().with_node_number(0x0010).with_channel(5);
    let remote = mock.remote();
    let mut device = DeviceHandle::new(mock);

    let config = AdapterConfig::from_json(r#"{ "command_timeout_ms": 500 }"#)?;
    let mut adapter = StreamAdapter::new(&mut device, config);

    println!("Version:      {}", adapter.get_version());
    println!("Node number:  0x{:04X}", adapter.get_node_number());
    println!("Group number: 0x{:08X}", adapter.get_group_number());
    println!("Channel:      {}", adapter.get_channel());

    // Writes are refused until the module is unlocked
    println!("Set channel without enable-write: {}", adapter.set_channel(7));
    println!("Enable write: {}", adapter.enable_write());
    println!("Set channel: {}", adapter.set_channel(7));

    adapter.on_receive(Box::new(|from: u16, data: &[u8]| {
        println!("Received {} bytes from 0x{:04X}: {:02X?}", data.len(), from, data);
    }));

    println!("Send: {}", adapter.send(0x0020, &[0xAA, 0xBB]));
    remote.deliver(0x0020, &[0x01, 0x02, 0x03]);

    println!("\nDriver saw {} calls", remote.calls().len());
    Ok(())
}
