// Centralized constants for runtime-image generation

/// Shared workspace directory where the build source is checked out
pub const DEFAULT_WORKSPACE_DIR: &str = "/workspace/source";

/// File name of the generated Dockerfile inside the workspace
pub const RUNTIME_DOCKERFILE: &str = "Dockerfile.runtime";

/// Stable kaniko executor image used to build and push the runtime image
pub const DEFAULT_BUILD_TOOL_IMAGE: &str = "gcr.io/kaniko-project/executor:v0.23.0";

/// Entry point of the kaniko executor image
pub const BUILD_TOOL_COMMAND: &str = "/kaniko/executor";

/// Location of the registry credentials mounted by the pipeline executor
pub const DEFAULT_DOCKER_CONFIG_DIR: &str = "/tekton/home/.docker";

/// Placeholder for credentials the surrounding system may override
pub const CREDENTIAL_NOT_SET: &str = "NOT_SET";

/// Shell used by the Dockerfile-write step
pub const SHELL: &str = "/bin/bash";

/// Root's UID
pub const ROOT_USER_ID: i64 = 0;

/// Name of the step writing the runtime Dockerfile
pub const DOCKERFILE_STEP_NAME: &str = "runtime-dockerfile";

/// Name of the step building and pushing the runtime image
pub const BUILD_AND_PUSH_STEP_NAME: &str = "kaniko-build-and-push";

/// Capabilities kaniko needs to unpack and chown image layers as root
pub const BUILD_TOOL_CAPABILITIES: [&str; 5] = ["CHOWN", "DAC_OVERRIDE", "FOWNER", "SETGID", "SETUID"];

/// Environment variables overriding the defaults above
pub const ENV_WORKSPACE_DIR: &str = "RUNTIME_IMAGE_WORKSPACE_DIR";
pub const ENV_BUILD_TOOL_IMAGE: &str = "RUNTIME_IMAGE_BUILD_TOOL_IMAGE";
pub const ENV_DOCKER_CONFIG_DIR: &str = "RUNTIME_IMAGE_DOCKER_CONFIG_DIR";
