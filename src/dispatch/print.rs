//! Dry-run transport: one JSON line per call.

use serde::Serialize;
use std::cell::RefCell;
use std::io::{self, Write};

use super::{BridgeCall, CallArg, Endpoint, Transport};
use crate::error::DeliveryError;

#[derive(Serialize)]
struct Line<'a> {
    method: &'a str,
    args: Vec<CallArg>,
}

/// Writes every call to a stream instead of the bus.
pub struct PrintTransport {
    out: RefCell<Box<dyn Write>>,
}

impl PrintTransport {
    pub fn new(out: Box<dyn Write>) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }
}

impl Transport for PrintTransport {
    fn deliver(&self, _endpoint: &Endpoint, call: BridgeCall) -> Result<(), DeliveryError> {
        let line = Line {
            method: call.method(),
            args: call.args(),
        };
        let mut out = self.out.borrow_mut();
        serde_json::to_writer(&mut *out, &line).map_err(io::Error::from)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "print"
    }
}
