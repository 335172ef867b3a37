pub mod bitcoin;
pub mod polymarket;
pub mod timestamp;

pub use bitcoin::load_bitcoin_data;
pub use polymarket::load_polymarket_data;
