//! Table-driven translation between canonical values and each API's dialect.

pub mod pair;
pub mod interval;
pub mod normalizer;
pub mod request;

pub use interval::to_interval_token;
pub use normalizer::normalize;
pub use pair::resolve;
pub use request::{build_url, RequestParams};
