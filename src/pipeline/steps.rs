use crate::build_spec::BuildSpecification;
use crate::config::RuntimeImageConfig;
use crate::constants::*;
use crate::docker::template::{Dockerfile, DockerfileTemplate};
use crate::error::{Result, RuntimeImageError};
use k8s_openapi::api::core::v1::{Capabilities, Container, EnvVar, SecurityContext};
use std::borrow::Cow;

fn env_var(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.to_string()),
        ..Default::default()
    }
}

/// Script decoding the base64 payload into `path`. Single quotes are safe
/// around base64 text and the target path is shell-escaped.
fn write_file_script(payload_b64: &str, path: &str) -> String {
    let target = shell_escape::unix::escape(Cow::Borrowed(path));
    format!(
        "set -o errexit -o pipefail; printf '%s' '{}' | base64 -d > {}",
        payload_b64, target
    )
}

/// Step writing the rendered Dockerfile to `<workspace>/Dockerfile.runtime`.
/// Runs as root in the builder image so it can write to the shared workspace.
pub fn dockerfile_step(
    spec: &BuildSpecification,
    dockerfile: &Dockerfile,
    config: &RuntimeImageConfig,
) -> Container {
    Container {
        name: DOCKERFILE_STEP_NAME.to_string(),
        image: Some(spec.builder_image_url.clone()),
        working_dir: Some(config.workspace_dir.clone()),
        security_context: Some(SecurityContext {
            run_as_user: Some(ROOT_USER_ID),
            ..Default::default()
        }),
        command: Some(vec![SHELL.to_string()]),
        args: Some(vec![
            "-x".to_string(),
            "-c".to_string(),
            write_file_script(&dockerfile.to_base64(), &config.dockerfile_path()),
        ]),
        ..Default::default()
    }
}

/// Step building the runtime Dockerfile with kaniko and pushing the result
/// to the build's output image. `context_dir` is the resolved build context,
/// see [`RuntimeImageConfig::context_dir`].
pub fn build_and_push_step(
    spec: &BuildSpecification,
    context_dir: &str,
    config: &RuntimeImageConfig,
) -> Container {
    Container {
        name: BUILD_AND_PUSH_STEP_NAME.to_string(),
        image: Some(config.build_tool_image.clone()),
        working_dir: Some(config.workspace_dir.clone()),
        security_context: Some(SecurityContext {
            run_as_user: Some(ROOT_USER_ID),
            capabilities: Some(Capabilities {
                add: Some(BUILD_TOOL_CAPABILITIES.iter().map(|c| c.to_string()).collect()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        env: Some(vec![
            env_var("DOCKER_CONFIG", &config.docker_config_dir),
            env_var("AWS_ACCESS_KEY_ID", &config.aws_access_key_id),
            env_var("AWS_SECRET_KEY", &config.aws_secret_key),
        ]),
        command: Some(vec![BUILD_TOOL_COMMAND.to_string()]),
        args: Some(vec![
            "--skip-tls-verify=true".to_string(),
            format!("--dockerfile={}", config.dockerfile_path()),
            format!("--context={}", context_dir),
            format!("--destination={}", spec.output_image_url),
        ]),
        ..Default::default()
    }
}

/// The Dockerfile-write step and the build-and-push step, always handled as
/// one unit so they can only be appended together and in this order.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeSteps {
    dockerfile: Container,
    build_and_push: Container,
}

impl RuntimeSteps {
    /// Renders the runtime Dockerfile with the built-in template and builds
    /// both steps from it.
    pub fn build(spec: &BuildSpecification, config: &RuntimeImageConfig) -> Result<Self> {
        Self::build_with(&DockerfileTemplate::new()?, spec, config)
    }

    /// Same as [`build`](Self::build) with an already compiled template.
    ///
    /// The write step runs in the builder image, so that one is required too.
    /// Every input is checked before anything is returned.
    pub fn build_with(
        template: &DockerfileTemplate,
        spec: &BuildSpecification,
        config: &RuntimeImageConfig,
    ) -> Result<Self> {
        if spec.builder_image_url.trim().is_empty() {
            return Err(RuntimeImageError::IncompleteSpecification {
                field: "builderImageUrl",
            });
        }
        let context_dir = config.context_dir(spec.context_dir())?;
        let dockerfile = template.render(spec)?;

        Ok(Self {
            dockerfile: dockerfile_step(spec, &dockerfile, config),
            build_and_push: build_and_push_step(spec, &context_dir, config),
        })
    }

    pub fn dockerfile(&self) -> &Container {
        &self.dockerfile
    }

    pub fn build_and_push(&self) -> &Container {
        &self.build_and_push
    }

    /// Both steps in execution order.
    pub fn into_steps(self) -> [Container; 2] {
        [self.dockerfile, self.build_and_push]
    }
}
