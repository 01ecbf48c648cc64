pub mod price;
pub mod size;
pub mod symbol;

pub use price::Price;
pub use size::Size;
pub use symbol::Symbol;

/// Exchange identifier
pub type ExchangeId = String;

/// Timestamp in milliseconds since the Unix epoch
pub type Timestamp = u64;

/// Current wall-clock time as a [`Timestamp`]
pub fn now_millis() -> Timestamp {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
