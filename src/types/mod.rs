pub mod candle;
pub mod pair;
pub mod timestamp;

pub use candle::{Candle, FetchResult};
pub use pair::{ApiPair, StreamTask};
