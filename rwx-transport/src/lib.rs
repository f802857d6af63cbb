pub mod codec;
pub mod memory;
pub mod stream;
pub mod transport;

pub use codec::{CodecError, EnvelopeCodec};
pub use memory::MemoryTransport;
pub use stream::FramedTransport;
pub use transport::{EnvelopeTransport, TransportError};
