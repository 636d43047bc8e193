//! # Domain Models
//!
//! Canonical instrument codes and quote records.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Market`] | Exchange / instrument class tag |
//! | [`InstrumentCode`] | Validated lowercase canonical code |
//! | [`QuoteSnapshot`] | Normalized quote produced by a fetch cycle |
//!
//! Codes are validated at construction time:
//!
//! ```rust,ignore
//! use stockpulse_core::InstrumentCode;
//!
//! let code = InstrumentCode::parse("SZ000001")?;
//! assert_eq!(code.as_str(), "sz000001");
//! ```

mod code;
mod quote;

pub use code::{InstrumentCode, Market};
pub use quote::QuoteSnapshot;
