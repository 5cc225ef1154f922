use crate::constants::*;
use crate::error::{Result, RuntimeImageError};
use serde::{Deserialize, Serialize};

/// Settings shared by the generated pipeline steps.
///
/// Defaults match the layout the pipeline executor provides: sources are
/// checked out to `/workspace/source` and registry credentials live under
/// `/tekton/home/.docker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeImageConfig {
    pub workspace_dir: String,
    pub dockerfile_name: String,
    pub build_tool_image: String,
    pub docker_config_dir: String,
    pub aws_access_key_id: String,
    pub aws_secret_key: String,
}

impl Default for RuntimeImageConfig {
    fn default() -> Self {
        Self {
            workspace_dir: DEFAULT_WORKSPACE_DIR.to_string(),
            dockerfile_name: RUNTIME_DOCKERFILE.to_string(),
            build_tool_image: DEFAULT_BUILD_TOOL_IMAGE.to_string(),
            docker_config_dir: DEFAULT_DOCKER_CONFIG_DIR.to_string(),
            aws_access_key_id: CREDENTIAL_NOT_SET.to_string(),
            aws_secret_key: CREDENTIAL_NOT_SET.to_string(),
        }
    }
}

impl RuntimeImageConfig {
    /// Defaults overridden by `RUNTIME_IMAGE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            workspace_dir: get(ENV_WORKSPACE_DIR).unwrap_or(defaults.workspace_dir),
            build_tool_image: get(ENV_BUILD_TOOL_IMAGE).unwrap_or(defaults.build_tool_image),
            docker_config_dir: get(ENV_DOCKER_CONFIG_DIR).unwrap_or(defaults.docker_config_dir),
            ..defaults
        }
    }

    pub fn with_workspace_dir(mut self, dir: impl Into<String>) -> Self {
        self.workspace_dir = dir.into();
        self
    }

    pub fn with_build_tool_image(mut self, image: impl Into<String>) -> Self {
        self.build_tool_image = image.into();
        self
    }

    pub fn with_docker_config_dir(mut self, dir: impl Into<String>) -> Self {
        self.docker_config_dir = dir.into();
        self
    }

    /// Absolute path of the runtime Dockerfile inside the workspace.
    pub fn dockerfile_path(&self) -> String {
        let root = clean_root(&self.workspace_dir);
        format!("{}/{}", root.trim_end_matches('/'), self.dockerfile_name)
    }

    /// Build context for kaniko: the workspace root, or `context_dir` below it.
    /// A context directory resolving outside the workspace is rejected.
    pub fn context_dir(&self, context_dir: Option<&str>) -> Result<String> {
        match context_dir {
            Some(dir) => join_under(&self.workspace_dir, dir).ok_or_else(|| {
                RuntimeImageError::InvalidContextDir {
                    dir: dir.to_string(),
                }
            }),
            None => Ok(clean_root(&self.workspace_dir)),
        }
    }
}

/// POSIX join of `rel` below `root`. `rel` is always treated as relative and
/// `.` segments are dropped. `None` when `..` would climb above `root`.
pub(crate) fn join_under(root: &str, rel: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    for part in rel.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    let root = clean_root(root);
    if segments.is_empty() {
        return Some(root);
    }
    let separator = if root.ends_with('/') { "" } else { "/" };
    Some(format!("{}{}{}", root, separator, segments.join("/")))
}

fn clean_root(root: &str) -> String {
    let trimmed = root.trim_end_matches('/');
    if trimmed.is_empty() && root.starts_with('/') {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
