// crates/gale-core/src/lib.rs
//
// gale-core: Core types, error taxonomy, events, and collaborator traits for
// the Gale pooled-staking reward ledger.
//
// This is the leaf crate the rest of the workspace depends on. It defines the
// account address type, the ledger-wide error enum, the observer event
// shapes, and the seams to the asset facilities and the block clock.

pub mod address;
pub mod error;
pub mod events;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use gale_core::Address;`
pub use address::Address;
pub use error::GaleError;
pub use events::{LedgerEvent, Transfer};
pub use traits::{AssetLedger, BlockClock};
