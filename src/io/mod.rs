mod byte_order;
mod byte_source;
mod memory_source;
mod stream_source;

pub use byte_order::{read_u16_be, read_u16_le, read_u32_be, read_u32_le, read_u64_be, ByteOrder};
pub use byte_source::ByteSource;
pub use memory_source::MemorySource;
pub use stream_source::StreamSource;
