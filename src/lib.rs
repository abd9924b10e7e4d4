//! monover - Dependency-aware release versioning library
//!
//! This library provides the core of a monorepo `version` command:
//! - Workspace discovery and package.json parsing
//! - The local dependency graph with cycle handling
//! - Update set collection, version resolution and specifier rewriting
//! - Git change detection, conventional-commit recommendations and changelogs

pub mod changelog;
pub mod changes;
pub mod cli;
pub mod collaborator;
pub mod config;
pub mod conventional;
pub mod domain;
pub mod error;
pub mod git;
pub mod graph;
pub mod logging;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod parser;
pub mod progress;
pub mod prompt;
pub mod propagation;
pub mod ranges;
pub mod update;
pub mod version;
