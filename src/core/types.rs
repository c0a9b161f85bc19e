//! Core data types for the IM920 wrappers

/// A radio frame addressed to, or received from, a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub node_id: u16,
    pub data: Vec<u8>,
}

impl Packet {
    pub fn new(node_id: u16, data: impl Into<Vec<u8>>) -> Self {
        Self {
            node_id,
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
