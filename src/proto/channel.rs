//! The narrow I/O boundary the reliability core is generic over. Real
//! implementations (backed by `UdpSocket`/`File`) live in [`crate::net`];
//! tests substitute in-memory fakes.

use std::io;
use std::time::Duration;

/// What the sender loop is waiting for this iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollIntent {
    /// Fast retransmit pending: only the outgoing side matters.
    SendOnly,
    /// Window has room and there's more file to read: wait on both.
    RecvAndSend,
    /// Window full or file exhausted: only incoming ACKs matter.
    RecvOnly,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    pub recv: bool,
    pub send: bool,
}

/// The sender's view of its datagram pair: one poll across both sockets
/// with a single timeout, then separate send/recv calls for whichever
/// side came back ready.
pub trait SenderChannel {
    fn poll(&mut self, intent: PollIntent, timeout: Duration) -> io::Result<Readiness>;
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;
    fn recv(&mut self, max_len: usize) -> io::Result<Vec<u8>>;
}

/// The receiver's view of its inbound socket: a single blocking call that
/// either yields a datagram or times out.
pub trait InboundChannel {
    fn recv(&mut self, timeout: Duration, max_len: usize) -> io::Result<Option<Vec<u8>>>;
}

pub trait OutboundChannel {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// `read_at(offset, n)` returns fewer than `n` bytes, or none, at EOF —
/// it never blocks waiting for more data to appear.
pub trait FileSource {
    fn read_at(&mut self, offset: u64, n: usize) -> io::Result<Vec<u8>>;
}

pub trait FileSink {
    fn append(&mut self, bytes: &[u8]) -> io::Result<()>;
}
