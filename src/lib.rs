//! Package metadata primitives for the MSYS2 repositories.
//!
//! This crate provides the text-format building blocks the repository
//! tooling needs to describe packages for vulnerability matching and
//! SBOM generation:
//!
//! - [`Cpe`]: CPE 2.2 URIs and CPE 2.3 formatted strings, parsed into
//!   their first four components and written back as canonical CPE 2.2.
//! - [`Srcinfo`]: `.SRCINFO` documents with their `pkgbase` block and the
//!   per-package overrides.
//! - [`vercmp`]: the pacman version order over `[epoch~]version[-release]`.
//!
//! On top of these it derives SBOM [`Component`] identities from a
//! package's SRCINFO and [`References`], and reads pacman repository
//! [`Desc`] entries.
//!
//! # Examples
//!
//! ```
//! use std::cmp::Ordering;
//! use msys2_metadata::{vercmp, Cpe, CpeComponent, Srcinfo};
//!
//! let srcinfo = Srcinfo::parse("pkgbase = bash\n\tpkgver = 5.2.037\n\tpkgrel = 1\n").unwrap();
//! assert_eq!(srcinfo.pkgver(), Some("5.2.037"));
//!
//! let cpe = Cpe::parse("cpe:2.3:a:gnu:bash").unwrap();
//! assert_eq!(cpe.version, CpeComponent::Any);
//!
//! assert_eq!(vercmp("5.2.037-1", "5.2.26-2"), Ordering::Greater);
//! ```

mod component;
mod cpe;
mod desc;
mod error;
mod references;
mod srcinfo;
mod version;

// Re-export public types
pub use component::{Component, ComponentKey};
pub use cpe::{build_cpe22, normalize_cpe, Cpe, CpeComponent};
pub use desc::Desc;
pub use error::{Error, Result};
pub use references::References;
pub use srcinfo::{Record, Srcinfo};
pub use version::{extract_upstream_version, vercmp, Version};
