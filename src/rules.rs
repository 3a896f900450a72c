// Rules module: loads the rules file from disk, checks that it is JSON and
// wraps it in the release payload the rules API expects.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::IgnoredAny;
use serde::Serialize;
use tracing::debug;

use crate::error::{DeployError, Result};

/// File name the payload declares for the uploaded source.
pub const RULES_FILE_NAME: &str = "firestore.rules";

/// Raw text of a rules file that has passed the JSON syntax check.
///
/// Only JSON syntax is checked; the Firestore rules grammar is left to the
/// server.
#[derive(Debug, Clone)]
pub struct RulesDocument {
    path: PathBuf,
    content: String,
}

impl RulesDocument {
    /// Read `path` and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| DeployError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "read rules file");
        Self::from_text(path, content)
    }

    /// Validate text that was obtained elsewhere. `path` is only used for
    /// error messages.
    pub fn from_text(path: &Path, content: String) -> Result<Self> {
        serde_json::from_str::<IgnoredAny>(&content).map_err(|e| DeployError::Validation {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(RulesDocument {
            path: path.to_path_buf(),
            content,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Body of `POST /v1/projects/{project}/releases`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ReleasePayload {
    pub source: Source,
    #[serde(rename = "testSuite")]
    pub test_suite: TestSuite,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Source {
    pub files: Vec<SourceFile>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

/// Always sent empty.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct TestSuite {}

/// A fully populated release request for one project.
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    pub project_id: String,
    pub payload: ReleasePayload,
}

impl DeploymentRequest {
    pub fn new(project_id: &str, rules: &RulesDocument) -> Self {
        DeploymentRequest {
            project_id: project_id.to_string(),
            payload: ReleasePayload {
                source: Source {
                    files: vec![SourceFile {
                        name: RULES_FILE_NAME.to_string(),
                        content: rules.content().to_string(),
                    }],
                },
                test_suite: TestSuite::default(),
            },
        }
    }
}
