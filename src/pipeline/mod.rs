pub mod steps;
pub mod strategy;

use crate::build_spec::BuildSpecification;
use crate::config::RuntimeImageConfig;
use crate::docker::template::DockerfileTemplate;
use crate::error::Result;
use crate::log_runtime_steps_appended;
pub use steps::{build_and_push_step, dockerfile_step, RuntimeSteps};
pub use strategy::{
    AnyBuildStrategy, BuildSteps, BuildStrategy, BuildStrategySpec,
    ClusterBuildStrategy, HasBuildSteps,
};

/// Appends the runtime-image steps to `strategy`: first the step writing the
/// rendered Dockerfile, then the kaniko build-and-push step.
///
/// Rendering happens before anything is appended, so on error the step list
/// is left as it was. Not idempotent: every call appends another pair.
pub fn amend_with_runtime_image<S>(
    strategy: &mut S,
    spec: &BuildSpecification,
    config: &RuntimeImageConfig,
) -> Result<()>
where
    S: HasBuildSteps + ?Sized,
{
    amend_with_template(strategy, &DockerfileTemplate::new()?, spec, config)
}

/// Same as [`amend_with_runtime_image`] with an already compiled template,
/// for callers amending many strategies in a row.
pub fn amend_with_template<S>(
    strategy: &mut S,
    template: &DockerfileTemplate,
    spec: &BuildSpecification,
    config: &RuntimeImageConfig,
) -> Result<()>
where
    S: HasBuildSteps + ?Sized,
{
    let steps = RuntimeSteps::build_with(template, spec, config)?;

    let build_steps = strategy.build_steps_mut();
    build_steps.append_runtime_steps(steps);

    log_runtime_steps_appended!(&spec.output_image_url, build_steps.len());
    Ok(())
}

/// Amends a namespaced [`BuildStrategy`] with runtime-image steps.
pub fn amend_build_strategy(
    strategy: &mut BuildStrategy,
    spec: &BuildSpecification,
    config: &RuntimeImageConfig,
) -> Result<()> {
    amend_with_runtime_image(strategy, spec, config)
}

/// Amends a [`ClusterBuildStrategy`] with runtime-image steps.
pub fn amend_cluster_build_strategy(
    strategy: &mut ClusterBuildStrategy,
    spec: &BuildSpecification,
    config: &RuntimeImageConfig,
) -> Result<()> {
    amend_with_runtime_image(strategy, spec, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeImageError;
    use k8s_openapi::api::core::v1::Container;

    fn build() -> BuildSpecification {
        BuildSpecification::new(
            "test/builder-image:latest",
            "test/output-image:latest",
            "test/base-image:latest",
        )
        .with_directory("/path/to/b")
    }

    fn names(steps: &BuildSteps) -> Vec<&str> {
        steps.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_amend_empty_spec() {
        let mut spec = BuildStrategySpec::default();
        amend_with_runtime_image(&mut spec, &build(), &RuntimeImageConfig::default()).unwrap();
        assert_eq!(
            names(&spec.build_steps),
            vec!["runtime-dockerfile", "kaniko-build-and-push"]
        );
    }

    #[test]
    fn test_existing_steps_kept_in_front() {
        let existing = vec![
            Container {
                name: "source-default".to_string(),
                ..Default::default()
            },
            Container {
                name: "build-and-push".to_string(),
                ..Default::default()
            },
        ];
        let mut strategy = BuildStrategy::new(
            "buildah",
            BuildStrategySpec {
                build_steps: existing.clone().into(),
            },
        );

        amend_build_strategy(&mut strategy, &build(), &RuntimeImageConfig::default()).unwrap();

        let steps = strategy.build_steps().as_slice();
        assert_eq!(&steps[..2], existing.as_slice());
        assert_eq!(
            names(strategy.build_steps()),
            vec![
                "source-default",
                "build-and-push",
                "runtime-dockerfile",
                "kaniko-build-and-push"
            ]
        );
    }

    #[test]
    fn test_amend_twice_appends_four_steps() {
        let mut spec = BuildStrategySpec::default();
        let config = RuntimeImageConfig::default();
        amend_with_runtime_image(&mut spec, &build(), &config).unwrap();
        amend_with_runtime_image(&mut spec, &build(), &config).unwrap();
        assert_eq!(spec.build_steps.len(), 4);
    }

    #[test]
    fn test_failed_render_leaves_steps_untouched() {
        let mut strategy = ClusterBuildStrategy::new("kaniko", BuildStrategySpec::default());
        let incomplete = BuildSpecification::new("builder", "output", "");

        let err = amend_cluster_build_strategy(
            &mut strategy,
            &incomplete,
            &RuntimeImageConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(err, RuntimeImageError::IncompleteSpecification { .. }));
        assert!(strategy.build_steps().is_empty());
    }

    #[test]
    fn test_both_scopes_receive_identical_steps() {
        let config = RuntimeImageConfig::default();
        let mut namespaced = BuildStrategy::new("kaniko", BuildStrategySpec::default());
        let mut cluster = ClusterBuildStrategy::new("kaniko", BuildStrategySpec::default());

        amend_build_strategy(&mut namespaced, &build(), &config).unwrap();
        amend_cluster_build_strategy(&mut cluster, &build(), &config).unwrap();

        assert_eq!(namespaced.build_steps(), cluster.build_steps());
    }

    #[test]
    fn test_escaping_context_dir_leaves_steps_untouched() {
        let mut spec = BuildStrategySpec::default();
        let build = build().with_context_dir("../outside");

        let err = amend_with_runtime_image(&mut spec, &build, &RuntimeImageConfig::default())
            .unwrap_err();

        assert!(matches!(err, RuntimeImageError::InvalidContextDir { .. }));
        assert!(spec.build_steps.is_empty());
    }

    #[test]
    fn test_reused_template_across_strategies() {
        let config = RuntimeImageConfig::default();
        let template = DockerfileTemplate::new().unwrap();
        let mut first = BuildStrategy::new("kaniko", BuildStrategySpec::default());
        let mut second = BuildStrategy::new("buildah", BuildStrategySpec::default());

        amend_with_template(&mut first, &template, &build(), &config).unwrap();
        amend_with_template(&mut second, &template, &build(), &config).unwrap();

        let mut fresh = BuildStrategySpec::default();
        amend_with_runtime_image(&mut fresh, &build(), &config).unwrap();
        assert_eq!(first.build_steps(), &fresh.build_steps);
        assert_eq!(second.build_steps(), &fresh.build_steps);
    }

    #[test]
    fn test_amend_through_any_strategy() {
        let mut strategy = AnyBuildStrategy::Cluster(ClusterBuildStrategy::new(
            "kaniko",
            BuildStrategySpec::default(),
        ));
        amend_with_runtime_image(&mut strategy, &build(), &RuntimeImageConfig::default()).unwrap();
        assert_eq!(strategy.build_steps().len(), 2);
    }
}
