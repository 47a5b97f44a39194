//! Ready-made transports

pub mod channel;
pub mod memory;

pub use channel::ChannelTransport;
pub use memory::MemoryTransport;
