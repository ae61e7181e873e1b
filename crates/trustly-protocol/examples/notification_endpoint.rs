//! Answers one notification the way an HTTP endpoint would.
//!
//! Reads a notification body from the file given as first argument (or from
//! stdin), prints the acknowledgement JSON on stdout and logs through
//! `trustly-core`'s tracing setup.
//!
//! ```text
//! TRUSTLY_HOST=trustly.com cargo run -p trustly-protocol --example notification_endpoint -- body.json
//! ```

use std::io::Read;
use std::process::ExitCode;

use tracing::{error, info, warn};
use trustly_core::{ApiConfig, TracingConfig, init_tracing};
use trustly_protocol::{
    NotificationRequest, NotificationResponse, ProtocolError, encode_document_string,
};

fn read_body() -> std::io::Result<Vec<u8>> {
    match std::env::args_os().nth(1) {
        Some(path) => std::fs::read(path),
        None => {
            let mut body = Vec::new();
            std::io::stdin().read_to_end(&mut body)?;
            Ok(body)
        }
    }
}

fn acknowledge(body: Vec<u8>) -> Result<String, ProtocolError> {
    let notification = NotificationRequest::from_body(body)?;
    info!(
        method = notification.method()?.unwrap_or("-"),
        uuid = notification.uuid()?.unwrap_or("-"),
        "notification received"
    );

    let processed = notification.data()?.is_some();
    let ack = NotificationResponse::new(&notification, Some(processed))?;
    encode_document_string(&ack)
}

fn main() -> ExitCode {
    if let Err(err) = init_tracing(TracingConfig::service()) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let config = match ApiConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "invalid endpoint configuration");
            return ExitCode::FAILURE;
        }
    };
    match config.endpoint_url() {
        Ok(url) => info!(%url, production = config.is_production(), "answering for API"),
        Err(err) => warn!(%err, "endpoint url does not resolve"),
    }

    let body = match read_body() {
        Ok(body) => body,
        Err(err) => {
            error!(%err, "failed to read notification body");
            return ExitCode::FAILURE;
        }
    };

    match acknowledge(body) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) if err.is_version() => {
            warn!(%err, "rejecting notification");
            ExitCode::from(2)
        }
        Err(err) => {
            error!(%err, "unprocessable notification");
            ExitCode::FAILURE
        }
    }
}
