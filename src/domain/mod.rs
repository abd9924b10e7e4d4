//! Core domain models for monover
//!
//! This module contains the fundamental types used throughout the application:
//! - Workspace packages and their manifest dependency entries
//! - Dependency specifiers, parsed up front so rewrites work on structured data
//! - Semantic version arithmetic
//! - Release result structures

mod bump;
mod package;
mod release;
mod specifier;

pub use bump::{
    apply_build_metadata, graduate, increment, prerelease_id, same_version, ReleaseType,
    DEFAULT_PREID,
};
pub use package::{DependencyType, ManifestDependency, Package};
pub use release::{
    BumpKind, ManifestRewrite, Modifiers, PackageChange, VersionAssignment, VersionChange,
    VersionMode,
};
pub use specifier::{Specifier, SpecifierKind};
