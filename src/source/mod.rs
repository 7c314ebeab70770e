pub mod fred;
pub mod klines;
pub mod traits;

pub use fred::FredClient;
pub use klines::KlineClient;
pub use traits::{CandleSource, IndicatorSource};
