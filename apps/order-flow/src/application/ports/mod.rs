//! Application Ports
//!
//! Ports define interfaces for interacting with external systems.
//! The session engine is the only driven port: it sends our messages and
//! delivers the venue's.

mod session_port;

pub use session_port::{
    InboundMessage, MsgType, NewOrderSingle, OutboundMessage, SessionError, SessionEvent,
    SessionPort,
};
