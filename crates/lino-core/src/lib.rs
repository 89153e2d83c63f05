// crates/lino-core/src/lib.rs
//
// lino-core: Core types, fixed-point arithmetic, events, and storage traits
// for the Lino ledger.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the coin and decimal types every economic calculation uses, the
// deferred `Event` sum type, block-time helpers, the `KvStore` interface, and
// the protocol-wide error type.

pub mod coin;
pub mod dec;
pub mod error;
pub mod event;
pub mod param;
pub mod time;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use lino_core::Coin;`

// Numeric types
pub use coin::{Coin, COIN_PER_LINO};
pub use dec::Dec;

// Events
pub use event::{
    CoinReturnEvent, Event, ParamChangeEvent, PostRewardEvent, ProposalDecisionEvent,
    ProposalType, ReturnType, TimeEventList,
};

// Parameters
pub use param::{GlobalAllocationParam, GlobalInitParams, Parameter, ProposalParam};

// Time
pub use time::{day_index, minute_index, timestamp_key, BlockHeader};

// Error type
pub use error::LinoError;

// Traits
pub use traits::KvStore;
