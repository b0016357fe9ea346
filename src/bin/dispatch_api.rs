#[macro_use]
extern crate rocket;

use devicectl::api::{self, ApiState};
use devicectl::{init_logging, DefaultsSource, FileDefaults, SerialTransport};
use log::error;
use rocket::Config;
use std::net::{IpAddr, Ipv4Addr};
use std::process;

#[launch]
fn rocket() -> _ {
    // Rocket keeps an already installed logger.
    init_logging();
    let source = match std::env::var_os("DEVICE_DEFAULTS") {
        Some(path) => FileDefaults::explicit(path),
        None => FileDefaults::discover(),
    };
    let defaults = match source.load() {
        Ok(d) => d,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let mut config = Config::release_default();
    config.address = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
    config.port = 43880;

    api::mount(rocket::custom(config), ApiState::new(defaults, SerialTransport))
}
