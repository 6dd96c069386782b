//! Sender-side sliding window, retransmission, and RTT estimation.

use std::io;
use std::time::Duration;

use log::{debug, info, warn};

use crate::clock::Clock;
use crate::proto::channel::{FileSource, PollIntent, SenderChannel};
use crate::proto::rtt::RttTracker;
use crate::proto::segment;
use crate::proto::toi::TOICalculator;

#[derive(Debug, Clone, Copy)]
pub struct SenderConfig {
    pub src_port: u16,
    pub dst_port: u16,
    /// Bytes read from the file per outgoing segment.
    pub obuffer_size: usize,
    /// Max bytes allowed outstanding (sent but not cumulatively ACKed).
    pub window_size: u32,
    /// Max bytes read from the recv socket per datagram.
    pub ibuffer_size: usize,
}

struct SenderState {
    send_base: u32,
    send_next: u32,
    done: bool,
    dup_ack_count: u32,
    rtt: RttTracker,
    min_rtt: f64,
    toi: TOICalculator,
}

impl SenderState {
    fn new() -> Self {
        SenderState {
            send_base: 0,
            send_next: 0,
            done: false,
            dup_ack_count: 0,
            rtt: RttTracker::new(),
            min_rtt: f64::INFINITY,
            toi: TOICalculator::default(),
        }
    }
}

/// Streams `file` to the peer over `channel` until a cumulative ACK
/// confirms the final FIN, then returns. Runs the single-threaded,
/// cooperative event loop described by the protocol: one readiness poll
/// per iteration, ACK handling before transmit before timeout-retransmit.
pub fn run<C, F, CL>(channel: &mut C, file: &mut F, cfg: &SenderConfig, clock: &CL) -> io::Result<()>
where
    C: SenderChannel,
    F: FileSource,
    CL: Clock,
{
    let mut state = SenderState::new();

    loop {
        let intent = poll_intent(&state, cfg);
        let timeout = Duration::from_secs_f64(state.toi.toi());
        let readiness = channel.poll(intent, timeout)?;

        if readiness.recv {
            if handle_ack(channel, cfg, clock, &mut state)? {
                return Ok(());
            }
        }

        if readiness.send {
            if handle_send(channel, file, cfg, clock, &mut state)? {
                return Ok(());
            }
        }

        if !readiness.recv && !readiness.send {
            handle_timeout(channel, file, cfg, &mut state)?;
        }
    }
}

fn poll_intent(state: &SenderState, cfg: &SenderConfig) -> PollIntent {
    if state.dup_ack_count >= 2 {
        PollIntent::SendOnly
    } else if !state.done
        && state.send_next as u64 + cfg.obuffer_size as u64 <= state.send_base as u64 + cfg.window_size as u64
    {
        PollIntent::RecvAndSend
    } else {
        PollIntent::RecvOnly
    }
}

/// Returns `true` once the peer has cumulatively ACKed the FIN this call
/// just emitted, signaling the caller to stop the loop.
fn handle_ack<C, CL>(
    channel: &mut C,
    cfg: &SenderConfig,
    clock: &CL,
    state: &mut SenderState,
) -> io::Result<bool>
where
    C: SenderChannel,
    CL: Clock,
{
    let datagram = channel.recv(cfg.ibuffer_size)?;
    let (_checksum_result, header, _payload) = segment::decode(&datagram);
    let a = header.ack_no;

    if state.send_base < a {
        state.send_base = a;
        state.dup_ack_count = 0;
        debug!("ack {a} advances send_base");

        if finish_if_done(channel, cfg, state)? {
            return Ok(true);
        }
    } else {
        state.dup_ack_count += 1;
        if state.dup_ack_count >= 2 {
            warn!("duplicate ack {a} (count {}), fast retransmit pending", state.dup_ack_count);
        }
    }

    if state.rtt.contains(a) {
        let (skip, send_time) = state.rtt.pop(a);
        let sample = clock.now().duration_since(send_time).as_secs_f64();
        state.min_rtt = state.min_rtt.min(sample);
        state.toi.update(sample);
        for _ in 0..skip {
            state.toi.update(state.min_rtt);
        }
        debug!("rtt sample {sample:.4}s ({skip} skipped), toi now {:.4}s", state.toi.toi());
    }

    Ok(false)
}

/// Returns `true` once the FIN has been sent and nothing remains
/// outstanding, signaling the caller to stop the loop.
fn handle_send<C, F, CL>(
    channel: &mut C,
    file: &mut F,
    cfg: &SenderConfig,
    clock: &CL,
    state: &mut SenderState,
) -> io::Result<bool>
where
    C: SenderChannel,
    F: FileSource,
    CL: Clock,
{
    if state.dup_ack_count >= 2 {
        let payload = file.read_at(state.send_base as u64, cfg.obuffer_size)?;
        let seg = segment::encode(&payload, cfg.src_port, cfg.dst_port, state.send_base, 0, 0, false, false);
        channel.send(&seg)?;
        info!("fast retransmit at {}", state.send_base);
        state.dup_ack_count = 0;
        return Ok(false);
    }

    let payload = file.read_at(state.send_next as u64, cfg.obuffer_size)?;
    if payload.is_empty() {
        state.done = true;
        debug!("file exhausted at {}", state.send_next);
        return finish_if_done(channel, cfg, state);
    }

    let seg = segment::encode(&payload, cfg.src_port, cfg.dst_port, state.send_next, 0, 0, false, false);
    channel.send(&seg)?;
    debug!("sent {} bytes at {}", payload.len(), state.send_next);
    state.send_next += payload.len() as u32;
    // Sample is keyed by the ack endpoint this segment expects, not the
    // offset it was sent from.
    state.rtt.record(state.send_next, clock.now());
    Ok(false)
}

/// Emits the terminal FIN once the file is exhausted and every byte sent
/// has been cumulatively ACKed. Checked from both the ack-advance path
/// and the EOF-discovery path, since either can be the one to observe
/// `send_base == send_next` last.
fn finish_if_done<C>(channel: &mut C, cfg: &SenderConfig, state: &mut SenderState) -> io::Result<bool>
where
    C: SenderChannel,
{
    if state.done && state.send_base == state.send_next {
        let fin = segment::encode(&[], cfg.src_port, cfg.dst_port, state.send_next, 0, 0, false, true);
        channel.send(&fin)?;
        info!("fin sent at {}, transfer complete", state.send_next);
        return Ok(true);
    }
    Ok(false)
}

fn handle_timeout<C, F>(channel: &mut C, file: &mut F, cfg: &SenderConfig, state: &mut SenderState) -> io::Result<()>
where
    C: SenderChannel,
    F: FileSource,
{
    state.toi.backoff(1.1);

    let payload = file.read_at(state.send_base as u64, cfg.obuffer_size)?;
    let seg = segment::encode(&payload, cfg.src_port, cfg.dst_port, state.send_base, 0, 0, false, false);
    channel.send(&seg)?;
    warn!("timeout, retransmitting {}, toi now {:.4}s", state.send_base, state.toi.toi());

    let ack_endpoint = state.send_base + payload.len() as u32;
    if state.rtt.contains(ack_endpoint) {
        state.rtt.remove(ack_endpoint);
    }
    Ok(())
}
