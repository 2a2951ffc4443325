//! Engine adapter implementations.

mod ask;
mod brave;
mod duckduckgo;
mod yahoo;

pub use ask::Ask;
pub use brave::Brave;
pub use duckduckgo::DuckDuckGo;
pub use yahoo::Yahoo;
