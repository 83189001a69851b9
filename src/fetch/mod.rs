pub mod client;
pub mod envelope;
pub mod transport;

pub use client::CandleClient;
pub use envelope::extract_candles;
pub use transport::ReqwestTransport;
