use devicectl::transport::{self, LineSettings};
use devicectl::{init_logging, Framing, SerialTransport};
use log::error;
use std::process;
use structopt::StructOpt;

/// Write "<device_id>:<action>" once to a serial port.
#[derive(StructOpt, Debug)]
#[structopt(name = "sendtest")]
struct Cli {
    device_id: String,
    action: String,
    #[structopt(long, default_value = "/dev/tty.usbserial-10")]
    port: String,
    #[structopt(long, default_value = "38400")]
    baud: u32,
}

fn main() {
    init_logging();
    let args: Cli = Cli::from_args();
    let line = LineSettings::new(&args.port, args.baud, Framing::default());
    match transport::send_action_tag(&SerialTransport, &line, &args.device_id, &args.action) {
        Ok(tag) => println!("Sent '{}' to device {}", tag, args.device_id),
        Err(e) => {
            error!(
                "Can't send '{}:{}' to {}: {}",
                args.device_id, args.action, args.port, e
            );
            process::exit(1);
        }
    }
}
