// External signing-request (ESR) protocol: payload codec and the
// parse / decline / accept / revoke state machine.
pub mod protocol;
pub mod request;

pub use protocol::SigningRequestProtocol;
