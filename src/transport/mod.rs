//! Producer/consumer transports.
//!
//! Two independent channels carry the packed record to consumers: a named
//! shared-memory window guarded by a cross-process lock, and fire-and-forget
//! UDP datagrams. Either or both may be enabled through configuration; the
//! record bytes are identical on both paths.

mod shared_memory;
mod udp;

pub use shared_memory::{SharedMemoryLink, MAPPING_NAME, MAPPING_SIZE, MUTEX_NAME};
pub use udp::{UdpReceiver, UdpSender};
