//! State-pack acquisition and caching.
//!
//! A [`PackResolver`] turns a state code into a state pack by consulting,
//! in order, the manifest, the local cache, the remote source and the
//! bundled seed. Every answer comes with a status saying where it came from
//! and how fresh it is.
//!
//! ```no_run
//! use statepack::{PackContext, PackOptions, PackResolver, PackStoreConfig};
//!
//! # async fn demo() {
//! let resolver = PackResolver::new(PackContext::from_config(PackStoreConfig::from_env()));
//! let result = resolver.get_pack("GA", PackOptions::default()).await;
//! println!("{}", result.describe());
//! # }
//! ```
//!
//! Supporting crates:
//! - [`statepack_types`]: manifest, pack, envelope and status types
//! - [`statepack_schema`]: validation and normalization
//! - [`statepack_store`]: filesystem and memory storage
//! - [`statepack_transport`]: HTTP transport
//! - [`statepack_seed`]: bundled seed packs

pub mod config;
pub mod context;
mod fetch;
pub mod inflight;
pub mod manifest_cache;
pub mod resolver;

pub use config::PackStoreConfig;
pub use context::{Clock, ManualClock, PackContext, RemoteSource, SystemClock};
pub use inflight::InflightFetches;
pub use manifest_cache::ManifestCache;
pub use resolver::{PackOptions, PackResolver};

pub use statepack_schema as schema;
pub use statepack_seed as seed;
pub use statepack_store as store;
pub use statepack_transport as transport;
pub use statepack_types as types;
