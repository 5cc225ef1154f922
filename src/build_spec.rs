use crate::error::{Result, RuntimeImageError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Build attributes consumed by runtime-image generation.
///
/// Environment variables and labels are kept in `BTreeMap`s: they are always
/// rendered sorted by key so the generated Dockerfile is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildSpecification {
    /// Image holding the pre-built artifacts, runs the Dockerfile-write step
    pub builder_image_url: String,
    /// Destination of the runtime image, also the base of the `builder` stage
    pub output_image_url: String,
    /// Base image of the final stage
    pub runtime_base_image_url: String,
    pub runtime_env: BTreeMap<String, String>,
    pub runtime_labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_work_dir: Option<String>,
    /// `src` or `src:dst` tokens, copied in list order
    pub runtime_directories: Vec<String>,
    pub runtime_entrypoint: Vec<String>,
    /// Relative to the workspace root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_context_dir: Option<String>,
}

impl BuildSpecification {
    pub fn new(
        builder_image_url: impl Into<String>,
        output_image_url: impl Into<String>,
        runtime_base_image_url: impl Into<String>,
    ) -> Self {
        Self {
            builder_image_url: builder_image_url.into(),
            output_image_url: output_image_url.into(),
            runtime_base_image_url: runtime_base_image_url.into(),
            ..Default::default()
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.runtime_env.insert(key.into(), value.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.runtime_labels.insert(key.into(), value.into());
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<String>) -> Self {
        self.runtime_work_dir = Some(dir.into());
        self
    }

    pub fn with_directory(mut self, token: impl Into<String>) -> Self {
        self.runtime_directories.push(token.into());
        self
    }

    pub fn with_entrypoint<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runtime_entrypoint = tokens.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context_dir(mut self, dir: impl Into<String>) -> Self {
        self.source_context_dir = Some(dir.into());
        self
    }

    /// Working directory, if one was set and is non-empty.
    pub fn work_dir(&self) -> Option<&str> {
        self.runtime_work_dir.as_deref().filter(|d| !d.is_empty())
    }

    /// Source context directory, if one was set and is non-empty.
    pub fn context_dir(&self) -> Option<&str> {
        self.source_context_dir.as_deref().filter(|d| !d.is_empty())
    }

    /// Checks the image references the rendered Dockerfile cannot do without.
    pub fn validate(&self) -> Result<()> {
        if self.output_image_url.trim().is_empty() {
            return Err(RuntimeImageError::IncompleteSpecification {
                field: "outputImageUrl",
            });
        }
        if self.runtime_base_image_url.trim().is_empty() {
            return Err(RuntimeImageError::IncompleteSpecification {
                field: "runtimeBaseImageUrl",
            });
        }
        Ok(())
    }
}
