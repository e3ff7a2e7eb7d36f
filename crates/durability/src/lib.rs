//! Durability layer for the apiary store
//!
//! This crate handles everything that touches disk:
//!
//! - Codec: section-framed, pipe-delimited text encoding of a snapshot
//! - Store: lock-guarded load and atomic save of one data file
//! - Bootstrap: the fixed dataset returned when no data file exists
//! - Staleness: mtime comparison against the last save or load

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bootstrap;
pub mod codec;
pub mod store;

pub use bootstrap::bootstrap_snapshot;
pub use codec::{
    decode_snapshot, delimiter_hazards, encode_snapshot, DecodeContext, Decoded, FieldHazard,
    NextIds, RecordCodec, Section,
};
pub use store::{DataStore, LoadReport, LoadSource};
