//! sockprep Core - Socket Path Preparation for Local Service Endpoints
//!
//! A process that serves an API over a Unix domain socket has two chores to
//! do before it can bind its listener:
//!
//! 1. Decide which permission bits the socket file will get, by installing a
//!    process-wide file-creation mask (umask).
//! 2. Get rid of a stale socket file left behind by a previous (possibly
//!    crashed) instance, without ever deleting something that is not a
//!    socket.
//!
//! This crate provides both, behind a single platform capability trait.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Caller (daemon main)                      │
//! │   config ──► SocketOptions ──► Bootstrap<NativePlatform>      │
//! └───────────────────────────────┬───────────────────────────────┘
//!                                 │ set_umask, cleanup
//! ┌───────────────────────────────┼───────────────────────────────┐
//! │                       SocketPlatform                          │
//! │   ┌───────────────────────┐       ┌───────────────────────┐   │
//! │   │ Posix (cfg(unix))     │       │ Portable (everywhere) │   │
//! │   │ - refuses non-sockets │       │ - removes any entry   │   │
//! │   │ - umask(2)            │       │ - umask unsupported   │   │
//! │   └───────────────────────┘       └───────────────────────┘   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! use sockprep_core::{cleanup_socket_file, set_umask, PermissionMask};
//!
//! # fn main() -> Result<(), sockprep_core::SocketError> {
//! match set_umask(PermissionMask::OWNER_ONLY) {
//!     Ok(previous) => println!("umask was {previous}"),
//!     Err(e) if e.is_unsupported() => {}
//!     Err(e) => return Err(e),
//! }
//! cleanup_socket_file(Path::new("/run/my-service/api.sock"))?;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Overview
//!
//! - [`platform`]: The [`SocketPlatform`] trait and its implementations
//! - [`mask`]: The [`PermissionMask`] value type
//! - [`error`]: Error taxonomy for cleanup and umask operations
//! - [`endpoint`]: Parsing `unix://` endpoints into socket paths
//! - [`config`]: TOML configuration with environment overrides
//! - [`bootstrap`]: The mask → cleanup → bind startup sequence

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bootstrap;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod mask;
pub mod platform;

// Re-exports for convenience
pub use bootstrap::{Bootstrap, BootstrapError, PreparedPath, SocketOptions};
#[cfg(unix)]
pub use bootstrap::BoundSocket;
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, ResolvedConfig, SockprepToml,
};
pub use endpoint::{default_socket_path, EndpointError, SocketEndpoint};
pub use error::SocketError;
pub use mask::{ParseMaskError, PermissionMask};
#[cfg(unix)]
pub use platform::Posix;
pub use platform::{
    cleanup_socket_file, set_umask, socket_exists, EntryKind, NativePlatform, Portable,
    SocketPlatform,
};
