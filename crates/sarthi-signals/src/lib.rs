//! Agri-Sarthi Signals — best-effort external lookups.
//!
//! Everything in this crate talks to services that may be down, slow,
//! or unconfigured, and the advisory pipeline degrades instead of
//! failing the request. Weather fetches and WhatsApp sends report
//! through [`Signal`] so callers can see the difference between
//! "worked", "not set up" and "broke". Market lookups always yield a
//! [`MarketPriceSnapshot`] because a seeded fallback price stands in
//! when scraping fails, and transcription degrades to an empty
//! transcript.

pub mod market;
pub mod relay;
pub mod signal;
pub mod transcribe;
pub mod weather;

pub use market::{MarketPriceSnapshot, MarketService};
pub use relay::WhatsAppRelay;
pub use signal::Signal;
pub use transcribe::SpeechToText;
pub use weather::{WeatherService, WeatherSnapshot};
