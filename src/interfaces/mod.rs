pub mod candle_sink;
pub mod http_transport;

pub use candle_sink::CandleSink;
pub use http_transport::{HttpResponse, HttpTransport};
