pub mod proxy;
pub mod gemini;
pub mod scraper;
pub mod prefill;
pub mod mapa;
pub mod docs;

pub use proxy::*;
pub use gemini::*;
pub use scraper::*;
pub use prefill::*;
pub use mapa::*;
pub use docs::*;
