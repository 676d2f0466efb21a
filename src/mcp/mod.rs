// MCP protocol surface: framing, session state and tool dispatch.
pub mod codec;
pub mod credentials;
pub mod dispatch;
pub mod handler;
pub mod protocol;
pub mod session;
pub mod tools;
pub mod transport;
