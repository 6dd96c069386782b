use std::fs::File;
use std::net::ToSocketAddrs;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use rdt::clock::SystemClock;
use rdt::cli::SenderArgs;
use rdt::net::UdpSenderChannel;
use rdt::proto::{self, SenderConfig};

fn main() -> ExitCode {
    env_logger::init();
    let args = SenderArgs::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("sender failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: SenderArgs) -> Result<(), rdt::Error> {
    let mut file = File::open(&args.file)?;

    let peer = format!("{}:{}", args.server_host, args.server_port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "server host resolved to no addresses")
        })?;

    let mut channel = UdpSenderChannel::bind(args.host.as_str(), args.recv_port, args.send_port, peer)?;

    let cfg = SenderConfig {
        src_port: args.send_port,
        dst_port: args.server_port,
        obuffer_size: args.obuffer_size,
        window_size: args.window_size,
        ibuffer_size: args.ibuffer_size,
    };

    info!("sending {} to {peer}", args.file);
    proto::run_sender(&mut channel, &mut file, &cfg, &SystemClock)?;
    Ok(())
}
