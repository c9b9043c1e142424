//! Worldstate Providers
//!
//! One provider per indicator, each total over its own failures:
//! - **Season**, **Cosmic**, **Atmosphere**, **Humanity**: deterministic models
//! - **Ascension**: astronaut roster + live aircraft count
//! - **Entropy**: volatility index + bitcoin daily move
//! - **Sentiment**: LLM-judged news headlines
//!
//! External data arrives through small source traits ([`AstronautSource`],
//! [`FlightSource`], [`MarketData`], [`HeadlineSource`], [`LlmBackend`]) so
//! providers can be exercised without a network.

pub mod ascension;
pub mod backend;
pub mod computed;
pub mod config;
pub mod entropy;
pub mod market;
pub mod news;
pub mod sentiment;
pub mod sky;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use ascension::*;
pub use backend::*;
pub use computed::*;
pub use config::*;
pub use entropy::*;
pub use market::*;
pub use news::*;
pub use sentiment::*;
pub use sky::*;
pub use traits::*;
