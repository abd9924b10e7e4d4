//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ValidationError: Fatal problems with the workspace or requested modifiers
//! - ManifestError: Issues reading, parsing or writing package.json files
//! - ConfigError: Issues with CLI options or the project configuration file
//! - CollaboratorError: Failures reported by git, prompts, recommenders, changelogs

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Workspace validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// External collaborator errors
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// Writing to the output stream failed
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Fatal validation errors raised before any version is computed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A non-private package has no version field
    #[error("A version field is required in {package}'s package.json file.")]
    MissingVersion { package: String },

    /// A package version is not a valid semantic version
    #[error("invalid version '{version}' in {package}: {message}")]
    InvalidVersion {
        package: String,
        version: String,
        message: String,
    },

    /// Two workspace members share a name
    #[error("duplicate package name '{name}' found in workspace")]
    DuplicatePackage { name: String },

    /// Prerelease and graduate were requested together
    #[error("--conventional-prerelease cannot be combined with --conventional-graduate.")]
    ConflictingModifiers,

    /// Prerelease identifier is not a valid semver identifier
    #[error("invalid prerelease identifier '{id}'")]
    InvalidPrereleaseId { id: String },

    /// Build metadata is not valid semver build metadata
    #[error("invalid build metadata '{metadata}'")]
    InvalidBuildMetadata { metadata: String },
}

/// Errors related to package.json operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write manifest file
    #[error("failed to write manifest file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },

    /// The manifest has no usable name field
    #[error("missing \"name\" field in {path}")]
    MissingName { path: PathBuf },

    /// A workspace package glob is malformed
    #[error("invalid workspace pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A field could not be located for an in-place update
    #[error("could not update '{field}' in {path}: {message}")]
    UpdateFailed {
        path: PathBuf,
        field: String,
        message: String,
    },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid bump keyword or explicit version
    #[error("invalid version bump '{value}': expected major, minor, patch, premajor, preminor, prepatch, prerelease or a semantic version")]
    InvalidBump { value: String },

    /// --independent passed to a fixed-mode project
    #[error("--independent is only valid for projects configured with \"version\": \"independent\"")]
    IndependentNotConfigured,

    /// Invalid premajor bump policy
    #[error("invalid premajor version bump '{value}': expected 'default' or 'force-patch'")]
    InvalidPremajorPolicy { value: String },

    /// Configuration file could not be parsed
    #[error("invalid configuration in {path}: {message}")]
    InvalidFile { path: PathBuf, message: String },

    /// Conflicting options
    #[error("conflicting options: {message}")]
    ConflictingOptions { message: String },

    /// Invalid path
    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: PathBuf, message: String },
}

/// Errors reported by external collaborators
#[derive(Error, Debug)]
pub enum CollaboratorError {
    /// A git command failed
    #[error("git {command} failed: {message}")]
    Git { command: String, message: String },

    /// Interactive prompt failed or was aborted
    #[error("prompt failed: {message}")]
    Prompt { message: String },

    /// Commit analysis failed for a package
    #[error("failed to recommend a version for {package}: {message}")]
    Recommendation { package: String, message: String },

    /// Changelog could not be written
    #[error("failed to update changelog at {path}: {message}")]
    Changelog { path: PathBuf, message: String },

    /// The requested changelog preset is not built in
    #[error("unknown changelog preset '{name}' (expected angular or conventionalcommits)")]
    UnknownPreset { name: String },
}

impl ValidationError {
    /// Creates a new MissingVersion error
    pub fn missing_version(package: impl Into<String>) -> Self {
        ValidationError::MissingVersion {
            package: package.into(),
        }
    }

    /// Creates a new InvalidVersion error
    pub fn invalid_version(
        package: impl Into<String>,
        version: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ValidationError::InvalidVersion {
            package: package.into(),
            version: version.into(),
            message: message.into(),
        }
    }
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new UpdateFailed error
    pub fn update_failed(
        path: impl Into<PathBuf>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ManifestError::UpdateFailed {
            path: path.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}

impl CollaboratorError {
    /// Creates a new Git error
    pub fn git(command: impl Into<String>, message: impl Into<String>) -> Self {
        CollaboratorError::Git {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates a new Prompt error
    pub fn prompt(message: impl Into<String>) -> Self {
        CollaboratorError::Prompt {
            message: message.into(),
        }
    }

    /// Creates a new Recommendation error
    pub fn recommendation(package: impl Into<String>, message: impl Into<String>) -> Self {
        CollaboratorError::Recommendation {
            package: package.into(),
            message: message.into(),
        }
    }
}

/// Errors that abort the release pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(e) => AppError::Validation(e),
            PipelineError::Collaborator(e) => AppError::Collaborator(e),
        }
    }
}
