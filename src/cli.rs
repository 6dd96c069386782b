//! Flag surface for the `sender` and `receiver` binaries. The role-specific
//! long names (`--server-host` vs `--client-host`) mirror the two
//! standalone CLI scripts this protocol descends from.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "sender", about = "Send a file over the reliable datagram protocol")]
pub struct SenderArgs {
    /// File to send.
    #[arg(short = 'f', long, default_value = "send.txt")]
    pub file: String,

    /// Local bind address.
    #[arg(short = 'a', long, default_value = "localhost")]
    pub host: String,

    /// Local UDP port for incoming ACKs.
    #[arg(short = 'i', long = "recv-port", default_value_t = 41190)]
    pub recv_port: u16,

    /// Local UDP port for outgoing segments.
    #[arg(short = 'o', long = "send-port", default_value_t = 41191)]
    pub send_port: u16,

    /// Receiver's address.
    #[arg(short = 'S', long = "server-host", default_value = "localhost")]
    pub server_host: String,

    /// Receiver's incoming-segment port.
    #[arg(short = 's', long = "server-port", default_value_t = 41192)]
    pub server_port: u16,

    /// Outgoing payload chunk size, in bytes.
    #[arg(short = 'b', long = "obuffer-size", default_value_t = 64)]
    pub obuffer_size: usize,

    /// Incoming datagram read size, in bytes.
    #[arg(short = 'B', long = "ibuffer-size", default_value_t = 2048)]
    pub ibuffer_size: usize,

    /// Max bytes outstanding (sent but not cumulatively ACKed).
    #[arg(short = 'w', long = "window-size", default_value_t = 2048)]
    pub window_size: u32,
}

#[derive(Debug, Parser)]
#[command(name = "receiver", about = "Receive a file over the reliable datagram protocol")]
pub struct ReceiverArgs {
    /// File to write the received bytes to.
    #[arg(short = 'f', long, default_value = "recv.txt")]
    pub file: String,

    /// Local bind address.
    #[arg(short = 'a', long, default_value = "localhost")]
    pub host: String,

    /// Local UDP port for incoming segments.
    #[arg(short = 'i', long = "recv-port", default_value_t = 41194)]
    pub recv_port: u16,

    /// Local UDP port for outgoing ACKs.
    #[arg(short = 'o', long = "send-port", default_value_t = 41195)]
    pub send_port: u16,

    /// Sender's address.
    #[arg(short = 'S', long = "client-host", default_value = "localhost")]
    pub client_host: String,

    /// Sender's incoming-ACK port.
    #[arg(short = 's', long = "client-port", default_value_t = 41190)]
    pub client_port: u16,

    /// Outgoing (ACK) payload chunk size, in bytes. ACKs are empty, so
    /// this only bounds the datagram buffer used to send them.
    #[arg(short = 'b', long = "obuffer-size", default_value_t = 2048)]
    pub obuffer_size: usize,

    /// Incoming datagram read size, in bytes.
    #[arg(short = 'B', long = "ibuffer-size", default_value_t = 2048)]
    pub ibuffer_size: usize,

    /// Reassembly buffer capacity, in bytes.
    #[arg(short = 'w', long = "window-size", default_value_t = 65535)]
    pub window_size: usize,
}
