//! VisionBoard core — board state management for a free-form vision board.
//!
//! ARCHITECTURE
//! ============
//! Authenticated users place folders on a 2D canvas, fill them with uploaded
//! files and text notes, and string colored connectors between them. All
//! durable state lives in a remote document/blob store reached through the
//! capability traits in [`store`]; this crate owns the in-memory mirror of
//! that state and every mutation against it.
//!
//! The [`board::BoardManager`] subscribes to per-collection snapshot streams
//! and treats each incoming snapshot as the authoritative full state — its
//! own pending writes are only observed once the store pushes them back.

pub mod board;
pub mod consts;
pub mod drag;
pub mod geometry;
pub mod model;
pub mod session;
pub mod store;
