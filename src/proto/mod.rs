//! The reliability core: segment codec, reassembly buffer, RTT/timeout
//! estimation, and the two orchestrating loops built on top of them.

pub mod channel;
pub mod reassembly;
pub mod receiver;
pub mod rtt;
pub mod segment;
pub mod sender;
pub mod toi;

pub use channel::{FileSink, FileSource, InboundChannel, OutboundChannel, PollIntent, Readiness, SenderChannel};
pub use reassembly::ReassemblyBuffer;
pub use receiver::{run as run_receiver, ReceiverConfig};
pub use rtt::RttTracker;
pub use sender::{run as run_sender, SenderConfig};
pub use toi::TOICalculator;
