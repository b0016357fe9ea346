use devicectl::*;
use serde_json::json;
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;

/// Send a device's action payload over a serial port and report the outcome
/// as one JSON line.
#[derive(StructOpt, Debug)]
#[structopt(name = "dispatch")]
struct Cli {
    #[structopt(long, required_unless = "list")]
    device: Option<String>,
    #[structopt(long, required_unless = "list")]
    action: Option<String>,
    /// Payload to send instead of the configured one
    #[structopt(long)]
    payload: Option<String>,
    #[structopt(long)]
    port: Option<String>,
    #[structopt(long)]
    baud: Option<u32>,
    #[structopt(long, default_value = "8", possible_values = &["5", "6", "7", "8"])]
    bytesize: ByteSize,
    #[structopt(long, default_value = "N", possible_values = &["N", "E", "O", "M", "S"])]
    parity: Parity,
    #[structopt(long, default_value = "1", possible_values = &["1", "1.5", "2"])]
    stopbits: StopBits,
    /// Device defaults file, searched for when not given
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,
    /// Print configured devices and their actions
    #[structopt(long)]
    list: bool,
}

impl Cli {
    fn request(&self) -> DispatchRequest {
        DispatchRequest {
            device: self.device.clone().unwrap_or_default(),
            action: self.action.clone().unwrap_or_default(),
            payload: self.payload.clone(),
            port: self.port.clone(),
            baud_rate: self.baud,
            byte_size: Some(self.bytesize),
            parity: Some(self.parity),
            stop_bits: Some(self.stopbits),
        }
    }

    fn defaults_source(&self) -> FileDefaults {
        match &self.config {
            Some(path) => FileDefaults::explicit(path),
            None => FileDefaults::discover(),
        }
    }
}

fn main() {
    init_logging();
    let args: Cli = Cli::from_args();
    let defaults = args.defaults_source().load();

    if args.list {
        match defaults {
            Ok(d) => println!("{}", json!(d.whitelist())),
            Err(e) => {
                println!("{}", json!({"ok": false, "error": e.to_string()}));
                process::exit(1);
            }
        }
        return;
    }

    let request = args.request();
    let result = match defaults {
        Ok(d) => dispatch(&request, &d, &SerialTransport),
        Err(e) => DispatchResult::rejected(&request, &e.into()),
    };
    println!("{}", result.to_json());
    process::exit(if result.ok { 0 } else { 1 });
}
