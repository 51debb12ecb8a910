//! Domain Layer
//!
//! Pure business logic without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - Sources, manifests, content, staging tree, lockfile
//! - `value_objects/` - Relative paths, hashes, profile selectors
//! - `services/` - Profile resolver, composer, planner
//! - `ports/` - Interface definitions for infrastructure

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
