use std::fs::File;
use std::net::ToSocketAddrs;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::info;

use rdt::cli::ReceiverArgs;
use rdt::net::bind_receiver;
use rdt::proto::{self, ReceiverConfig};

/// Fixed inactivity bound in case the sender's FIN is lost entirely.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(60);

fn main() -> ExitCode {
    env_logger::init();
    let args = ReceiverArgs::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("receiver failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: ReceiverArgs) -> Result<(), rdt::Error> {
    let mut file = File::create(&args.file)?;

    let peer = format!("{}:{}", args.client_host, args.client_port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "client host resolved to no addresses")
        })?;

    let (mut inbound, mut outbound) = bind_receiver(args.host.as_str(), args.recv_port, args.send_port, peer)?;

    let cfg = ReceiverConfig {
        src_port: args.send_port,
        dst_port: args.client_port,
        window_size: args.window_size,
        ibuffer_size: args.ibuffer_size,
        inactivity_timeout: INACTIVITY_TIMEOUT,
    };

    info!("receiving into {} from {peer}", args.file);
    match proto::run_receiver(&mut inbound, &mut outbound, &mut file, &cfg) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::TimedOut => {
            Err(rdt::Error::Inactive { after: INACTIVITY_TIMEOUT })
        }
        Err(err) => Err(err.into()),
    }
}
