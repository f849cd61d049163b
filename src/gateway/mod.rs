// RKSOK — Gateway Module
//
// TCP front-end for the phonebook. Reads one CRLF-CRLF framed request per
// connection, asks the regulatory authority for approval, and dispatches the
// verb to the configured store.

mod authority;
mod dispatch;
mod error;
mod frame;
mod protocol;
mod server;

pub use authority::{ApprovalOutcome, AuthorityClient};
pub use dispatch::{capability_for, Dispatcher};
pub use error::GatewayError;
pub use frame::read_frame;
pub use protocol::{
    parse_request, Message, Response, ResponseStatus, Verb, APPROVED, NOT_APPROVED, PROTOCOL,
};
pub use server::{Gateway, GatewayServer};
