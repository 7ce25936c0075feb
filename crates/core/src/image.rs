// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Image references and local-image matching.
//!
//! An image reference has the shape `[registry[:port]/]repository[:tag][@digest]`.
//! A colon only separates a tag when it follows the last `/`, so registry
//! ports are never mistaken for tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tag assumed by the runtime when a reference carries none.
pub const DEFAULT_TAG: &str = "latest";

/// Errors from parsing an image reference
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageRefError {
    #[error("image reference is empty")]
    Empty,
    #[error("invalid image reference {reference:?}: {reason}")]
    Invalid { reference: String, reason: &'static str },
}

/// How a configured reference is compared against locally known tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// An untagged reference is satisfied by any local tag of its
    /// repository; a tagged reference needs that exact tag.
    #[default]
    Repository,
    /// Repository and tag must both match (a missing tag means `latest`).
    Exact,
}

crate::simple_display! {
    MatchPolicy {
        Repository => "repository",
        Exact => "exact",
    }
}

/// Immutable reference naming the image to run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageRef {
    repository: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageRef {
    pub fn parse(reference: &str) -> Result<Self, ImageRefError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ImageRefError::Empty);
        }
        let invalid = |reason| ImageRefError::Invalid {
            reference: reference.to_string(),
            reason,
        };
        if reference.chars().any(char::is_whitespace) {
            return Err(invalid("contains whitespace"));
        }

        let (name, digest) = match reference.split_once('@') {
            Some((_, "")) => return Err(invalid("empty digest")),
            Some((name, digest)) => (name, Some(digest.to_string())),
            None => (reference, None),
        };

        let last_slash = name.rfind('/');
        let (repository, tag) = match name.rfind(':') {
            Some(colon) if last_slash.map_or(true, |slash| colon > slash) => {
                (&name[..colon], Some(&name[colon + 1..]))
            }
            _ => (name, None),
        };

        if repository.is_empty() || repository.starts_with('/') || repository.ends_with('/') {
            return Err(invalid("empty repository"));
        }
        if tag == Some("") {
            return Err(invalid("empty tag"));
        }

        Ok(Self {
            repository: repository.to_string(),
            tag: tag.map(str::to_string),
            digest,
        })
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// The tag the runtime would resolve this reference to.
    pub fn effective_tag(&self) -> &str {
        self.tag.as_deref().unwrap_or(DEFAULT_TAG)
    }

    /// Check whether a locally known `repository:tag` entry satisfies this reference.
    ///
    /// Dangling (`<none>`) and unparseable entries never match.
    pub fn matches(&self, repo_tag: &str, policy: MatchPolicy) -> bool {
        if repo_tag.starts_with("<none>") {
            return false;
        }
        let Ok(candidate) = ImageRef::parse(repo_tag) else {
            return false;
        };
        if canonical_repository(&candidate.repository) != canonical_repository(&self.repository) {
            return false;
        }
        match policy {
            MatchPolicy::Repository => match self.tag() {
                Some(tag) => candidate.effective_tag() == tag,
                None => true,
            },
            MatchPolicy::Exact => candidate.effective_tag() == self.effective_tag(),
        }
    }
}

/// Strip the implicit Docker Hub prefixes so `docker.io/library/alpine` and
/// `alpine` compare equal.
fn canonical_repository(repository: &str) -> &str {
    let repository = repository
        .strip_prefix("docker.io/")
        .or_else(|| repository.strip_prefix("index.docker.io/"))
        .unwrap_or(repository);
    repository.strip_prefix("library/").unwrap_or(repository)
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repository)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{}", tag)?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{}", digest)?;
        }
        Ok(())
    }
}

impl FromStr for ImageRef {
    type Err = ImageRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ImageRef {
    type Error = ImageRefError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ImageRef> for String {
    fn from(image: ImageRef) -> Self {
        image.to_string()
    }
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
