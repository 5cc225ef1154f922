pub mod build_spec;
pub mod config;
pub mod constants;
pub mod docker;
pub mod error;
pub mod logging;
pub mod pipeline;

pub use build_spec::BuildSpecification;
pub use config::RuntimeImageConfig;
pub use docker::{
    parse_directory, render_dockerfile, render_entrypoint, DirectoryMapping, Dockerfile,
    DockerfileTemplate,
};
pub use error::{Result, RuntimeImageError};
pub use pipeline::{
    amend_build_strategy, amend_cluster_build_strategy, amend_with_runtime_image,
    amend_with_template, AnyBuildStrategy,
    BuildSteps, BuildStrategy, BuildStrategySpec, ClusterBuildStrategy, HasBuildSteps, RuntimeSteps,
};
