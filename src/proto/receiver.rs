//! Receiver-side in-order delivery: validate, discard, buffer, or flush to
//! disk; emit one cumulative ACK per segment seen.

use std::io;
use std::time::Duration;

use log::{debug, info, warn};

use crate::proto::channel::{FileSink, InboundChannel, OutboundChannel};
use crate::proto::reassembly::ReassemblyBuffer;
use crate::proto::segment;

#[derive(Debug, Clone, Copy)]
pub struct ReceiverConfig {
    pub src_port: u16,
    pub dst_port: u16,
    /// Max bytes buffered out-of-order, ahead of `recv_base`.
    pub window_size: usize,
    /// Max bytes read from the recv socket per datagram.
    pub ibuffer_size: usize,
    /// How long to wait with no segment arriving before giving up.
    pub inactivity_timeout: Duration,
}

/// Drains `inbound` into `file` until a FIN-marked, intact segment
/// arrives or the inactivity timeout fires.
pub fn run<I, O, F>(inbound: &mut I, outbound: &mut O, file: &mut F, cfg: &ReceiverConfig) -> io::Result<()>
where
    I: InboundChannel,
    O: OutboundChannel,
    F: FileSink,
{
    let mut recv_base: u32 = 0;
    let mut buffer = ReassemblyBuffer::new(cfg.window_size);

    loop {
        let datagram = match inbound.recv(cfg.inactivity_timeout, cfg.ibuffer_size)? {
            Some(datagram) => datagram,
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("no segment received for {:?}", cfg.inactivity_timeout),
                ));
            }
        };

        let (checksum_result, header, payload) = segment::decode(&datagram);

        let mut fin = false;
        if checksum_result != 0 {
            warn!("corrupt segment discarded (seq={})", header.seq_no);
        } else if header.seq_no < recv_base {
            debug!("duplicate/stale segment at {} discarded", header.seq_no);
        } else if header.seq_no > recv_base {
            debug!("out-of-order segment at {} buffered", header.seq_no);
            buffer.push(header.seq_no, payload.to_vec());
        } else {
            let extra = buffer.pop(recv_base + payload.len() as u32);
            let mut delivered = payload.to_vec();
            delivered.extend_from_slice(&extra);
            file.append(&delivered)?;
            recv_base += delivered.len() as u32;
            debug!("delivered {} bytes, recv_base now {}", delivered.len(), recv_base);

            // The decoded header is only trustworthy once the checksum is
            // known intact — a corrupt FIN bit must never end the loop.
            fin = header.fin;
        }

        let ack = segment::encode(&[], cfg.src_port, cfg.dst_port, 0, recv_base, 0, true, false);
        outbound.send(&ack)?;

        if fin {
            info!("fin received at recv_base {}, transfer complete", recv_base);
            return Ok(());
        }
    }
}
