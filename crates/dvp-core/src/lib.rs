//! # dvp-core: Foundational Types for the dvp Plugin Toolchain
//!
//! Every other crate in the workspace depends on `dvp-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One enum per closed vocabulary.** [`PluginType`] and [`HostType`]
//!    are the only way to name an ingestion strategy or host platform.
//!    Adding a strategy forces every `match` to handle it.
//!
//! 2. **Validated identifiers.** [`PluginId`] checks its format at
//!    construction. Freshly generated identifiers are UUID v4 and valid by
//!    construction.
//!
//! 3. **Explicit encodings.** [`encoding::to_bytes`] and [`encoding::to_str`]
//!    normalize arbitrarily nested values between text and bytes, reporting
//!    every encoding attempted when decoding fails.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dvp-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod encoding;
pub mod error;
pub mod identity;
pub mod strategy;
pub mod version;

pub use encoding::{to_bytes, to_str, Encoding, NestedValue};
pub use error::{CoreError, DecodeError, EncodeError};
pub use identity::PluginId;
pub use strategy::{HostType, PluginType};
pub use version::{ApiVersion, ENGINE_API_VERSION, VIRTUALIZATION_API_VERSION};
