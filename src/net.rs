//! Concrete collaborators the reliability core is generic over: UDP
//! sockets polled with `nix`, and plain files. This is the only module
//! that touches `std::net::UdpSocket` or `std::fs::File` directly.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::os::fd::AsRawFd;
use std::time::Duration;

use nix::poll::{poll, PollFd, PollFlags};

use crate::proto::{FileSink, FileSource, InboundChannel, OutboundChannel, PollIntent, Readiness, SenderChannel};

fn to_io_error(err: nix::Error) -> io::Error {
    io::Error::from_raw_os_error(err as i32)
}

/// nix 0.26's `poll` takes a plain millisecond count, same as the
/// teacher's `poll(&mut pfd[..], 1)` on the TUN descriptor.
fn timeout_to_millis(timeout: Duration) -> i32 {
    timeout.as_millis().min(i32::MAX as u128) as i32
}

/// The sender's pair of local sockets: one bound to `recv_port` for
/// incoming ACKs, one bound to `send_port` for outgoing segments.
pub struct UdpSenderChannel {
    recv_sock: UdpSocket,
    send_sock: UdpSocket,
    peer: SocketAddr,
}

impl UdpSenderChannel {
    pub fn bind<A: ToSocketAddrs>(host: A, recv_port: u16, send_port: u16, peer: SocketAddr) -> io::Result<Self> {
        let addrs: Vec<SocketAddr> = host.to_socket_addrs()?.collect();
        let host = addrs
            .first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "host resolved to no addresses"))?
            .ip();

        let recv_sock = UdpSocket::bind((host, recv_port))?;
        let send_sock = UdpSocket::bind((host, send_port))?;
        recv_sock.set_nonblocking(true)?;
        send_sock.set_nonblocking(true)?;

        Ok(UdpSenderChannel { recv_sock, send_sock, peer })
    }
}

impl SenderChannel for UdpSenderChannel {
    fn poll(&mut self, intent: PollIntent, timeout: Duration) -> io::Result<Readiness> {
        let want_recv = matches!(intent, PollIntent::RecvOnly | PollIntent::RecvAndSend);
        let want_send = matches!(intent, PollIntent::SendOnly | PollIntent::RecvAndSend);

        let mut fds = Vec::with_capacity(2);
        if want_recv {
            fds.push(PollFd::new(self.recv_sock.as_raw_fd(), PollFlags::POLLIN));
        }
        if want_send {
            fds.push(PollFd::new(self.send_sock.as_raw_fd(), PollFlags::POLLOUT));
        }

        poll(&mut fds, timeout_to_millis(timeout)).map_err(to_io_error)?;

        let mut readiness = Readiness::default();
        let mut idx = 0;
        if want_recv {
            readiness.recv = fds[idx].revents().is_some_and(|e| e.contains(PollFlags::POLLIN));
            idx += 1;
        }
        if want_send {
            readiness.send = fds[idx].revents().is_some_and(|e| e.contains(PollFlags::POLLOUT));
        }
        Ok(readiness)
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.send_sock.send_to(bytes, self.peer)?;
        Ok(())
    }

    fn recv(&mut self, max_len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; max_len];
        let n = self.recv_sock.recv(&mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }
}

/// The receiver's inbound socket, bound to `recv_port`, read with a
/// blocking-with-timeout `recv`.
pub struct UdpInbound {
    sock: UdpSocket,
}

/// The receiver's outbound socket, bound to `send_port`, used only to
/// send ACKs back to the sender.
pub struct UdpOutbound {
    sock: UdpSocket,
    peer: SocketAddr,
}

/// Binds the receiver's two local sockets. Returned as a pair rather
/// than one struct implementing both channel traits, so the receiver
/// loop can hold an independent `&mut` to each side at once.
pub fn bind_receiver<A: ToSocketAddrs>(
    host: A,
    recv_port: u16,
    send_port: u16,
    peer: SocketAddr,
) -> io::Result<(UdpInbound, UdpOutbound)> {
    let addrs: Vec<SocketAddr> = host.to_socket_addrs()?.collect();
    let host = addrs
        .first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "host resolved to no addresses"))?
        .ip();

    let recv_sock = UdpSocket::bind((host, recv_port))?;
    let send_sock = UdpSocket::bind((host, send_port))?;

    Ok((UdpInbound { sock: recv_sock }, UdpOutbound { sock: send_sock, peer }))
}

impl InboundChannel for UdpInbound {
    fn recv(&mut self, timeout: Duration, max_len: usize) -> io::Result<Option<Vec<u8>>> {
        self.sock.set_read_timeout(Some(timeout))?;
        let mut buf = vec![0u8; max_len];
        match self.sock.recv(&mut buf) {
            Ok(n) => {
                buf.truncate(n);
                Ok(Some(buf))
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock || err.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl OutboundChannel for UdpOutbound {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.sock.send_to(bytes, self.peer)?;
        Ok(())
    }
}

impl FileSource for File {
    fn read_at(&mut self, offset: u64, n: usize) -> io::Result<Vec<u8>> {
        self.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; n];
        let mut read = 0;
        while read < n {
            match self.read(&mut buf[read..])? {
                0 => break,
                chunk => read += chunk,
            }
        }
        buf.truncate(read);
        Ok(buf)
    }
}

impl FileSink for File {
    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)?;
        self.flush()
    }
}
