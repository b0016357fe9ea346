//! HTTP front end over [`dispatch`](crate::dispatch).

use crate::error::{ErrorKind, ResolutionError, TransportError};
use crate::framing::FramingParseError;
use crate::{dispatch, DeviceDefaults, DispatchRequest, DispatchResult, Transport};
use log::error;
use rocket::http::Status;
use rocket::response::{self, Responder, Response};
use rocket::serde::json::Json;
use rocket::tokio::task;
use rocket::{get, put, routes, Build, Request, Rocket, State};
use schemars::schema::RootSchema;
use schemars::schema_for;
use std::collections::BTreeMap;
use std::io;
use std::str::FromStr;
use std::sync::Arc;

pub struct ApiState {
    defaults: Arc<DeviceDefaults>,
    transport: Arc<dyn Transport + Send + Sync>,
}

impl ApiState {
    pub fn new<T>(defaults: DeviceDefaults, transport: T) -> ApiState
    where
        T: Transport + Send + Sync + 'static,
    {
        ApiState {
            defaults: Arc::new(defaults),
            transport: Arc::new(transport),
        }
    }
}

/// A dispatch result with the HTTP status matching its outcome.
pub struct WebReply(DispatchResult);

impl<'r> Responder<'r, 'static> for WebReply {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = match self.0.failure {
            None => Status::Ok,
            Some(ErrorKind::Resolution) => Status::UnprocessableEntity,
            Some(ErrorKind::Config) | Some(ErrorKind::Transport) => Status::InternalServerError,
        };
        Response::build_from(Json(self.0).respond_to(req)?)
            .status(status)
            .ok()
    }
}

#[get("/devices")]
pub fn devices(state: &State<ApiState>) -> Json<BTreeMap<String, Vec<String>>> {
    Json(state.defaults.whitelist())
}

/// Serial writes block for up to the line timeout, so they run off the
/// async workers.
#[allow(clippy::too_many_arguments)]
#[put("/dispatch/<device>/<action>?<payload>&<port>&<baud>&<bytesize>&<parity>&<stopbits>")]
pub async fn dispatch_action(
    device: &str,
    action: &str,
    payload: Option<String>,
    port: Option<String>,
    baud: Option<&str>,
    bytesize: Option<&str>,
    parity: Option<&str>,
    stopbits: Option<&str>,
    state: &State<ApiState>,
) -> WebReply {
    let mut request = DispatchRequest::new(device, action);
    request.payload = payload;
    request.port = port;
    if let Err(e) = parse_overrides(&mut request, baud, bytesize, parity, stopbits) {
        return WebReply(DispatchResult::rejected(&request, &e.into()));
    }

    let defaults = Arc::clone(&state.defaults);
    let transport = Arc::clone(&state.transport);
    let job = request.clone();
    match task::spawn_blocking(move || dispatch(&job, &defaults, &*transport)).await {
        Ok(result) => WebReply(result),
        Err(e) => {
            error!("Dispatch task for {}/{} failed: {}", device, action, e);
            let err = TransportError::Io(io::Error::new(io::ErrorKind::Other, e.to_string()));
            WebReply(DispatchResult::rejected(&request, &err.into()))
        }
    }
}

#[get("/schema/result")]
pub fn result_schema() -> Json<RootSchema> {
    Json(schema_for!(DispatchResult))
}

#[get("/schema/defaults")]
pub fn defaults_schema() -> Json<RootSchema> {
    Json(schema_for!(DeviceDefaults))
}

pub fn mount(rocket: Rocket<Build>, state: ApiState) -> Rocket<Build> {
    rocket.manage(state).mount(
        "/",
        routes![devices, dispatch_action, result_schema, defaults_schema],
    )
}

fn parse_overrides(
    request: &mut DispatchRequest,
    baud: Option<&str>,
    bytesize: Option<&str>,
    parity: Option<&str>,
    stopbits: Option<&str>,
) -> Result<(), ResolutionError> {
    request.baud_rate = baud
        .map(|value| {
            value
                .parse::<u32>()
                .map_err(|_| ResolutionError::InvalidBaudRate {
                    value: value.to_string(),
                })
        })
        .transpose()?;
    request.byte_size = parse(bytesize)?;
    request.parity = parse(parity)?;
    request.stop_bits = parse(stopbits)?;
    Ok(())
}

fn parse<T: FromStr<Err = FramingParseError>>(
    value: Option<&str>,
) -> Result<Option<T>, FramingParseError> {
    value.map(str::parse).transpose()
}
