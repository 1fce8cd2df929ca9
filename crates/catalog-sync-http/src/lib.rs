pub mod transport;
pub mod wire;

pub use transport::{HttpTransport, HttpTransportConfig};
