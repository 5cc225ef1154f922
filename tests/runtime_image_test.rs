use base64::Engine;
use runtime_image::{
    amend_build_strategy, amend_with_runtime_image, render_dockerfile, AnyBuildStrategy,
    BuildSpecification, BuildStrategy, BuildStrategySpec, HasBuildSteps, RuntimeImageConfig,
};
use std::fs;

const EXPECTED_DOCKERFILE: &str = r#"FROM test/output-image:latest as builder

FROM test/base-image:latest
ENV ENVIRONMENT_VARIABLE="VALUE"
LABEL label="value"
COPY --from=builder "/path/to/a" "/new/path/to/a"
COPY --from=builder "/path/to/b" "/path/to/b"
WORKDIR "/workdir"
ENTRYPOINT [ "/bin/bash", "-x", "-c" ]"#;

fn fixture_build() -> BuildSpecification {
    let yaml = fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/build.yaml"))
        .expect("Failed to read build fixture");
    serde_yaml::from_str(&yaml).expect("Failed to parse build fixture")
}

fn fixture_strategy() -> AnyBuildStrategy {
    let yaml = fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/cluster_strategy.yaml"
    ))
    .expect("Failed to read strategy fixture");
    serde_yaml::from_str(&yaml).expect("Failed to parse strategy fixture")
}

/// Decodes what the write step would put on disk.
fn written_dockerfile(script: &str) -> String {
    let marker = "printf '%s' '";
    let start = script.find(marker).expect("payload marker") + marker.len();
    let end = start + script[start..].find('\'').expect("payload end");
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&script[start..end])
        .expect("valid base64");
    String::from_utf8(bytes).expect("utf-8 Dockerfile")
}

#[test]
fn test_fixture_renders_expected_dockerfile() {
    let dockerfile = render_dockerfile(&fixture_build()).unwrap();
    assert_eq!(dockerfile.as_str(), EXPECTED_DOCKERFILE);
    assert!(!dockerfile.as_str().ends_with('\n'));
}

#[test]
fn test_amend_cluster_strategy_end_to_end() {
    let build = fixture_build();
    let mut strategy = fixture_strategy();
    let original: Vec<_> = strategy.build_steps().as_slice().to_vec();

    amend_with_runtime_image(&mut strategy, &build, &RuntimeImageConfig::default()).unwrap();

    let steps = strategy.build_steps().as_slice();
    assert_eq!(steps.len(), original.len() + 2);
    assert_eq!(&steps[..original.len()], original.as_slice());

    let write = &steps[original.len()];
    let push = &steps[original.len() + 1];
    assert_eq!(write.name, "runtime-dockerfile");
    assert_eq!(push.name, "kaniko-build-and-push");

    let script = &write.args.as_ref().unwrap()[2];
    assert_eq!(written_dockerfile(script), EXPECTED_DOCKERFILE);
}

#[test]
fn test_amended_strategy_serializes_back() {
    let mut strategy = fixture_strategy();
    amend_with_runtime_image(&mut strategy, &fixture_build(), &RuntimeImageConfig::default())
        .unwrap();

    let yaml = serde_yaml::to_string(&strategy).unwrap();
    let reparsed: AnyBuildStrategy = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(reparsed, strategy);
    assert_eq!(reparsed.kind(), "ClusterBuildStrategy");
    assert!(yaml.contains("kaniko-build-and-push"));
}

#[test]
fn test_hostile_values_survive_the_write_step() {
    let build = BuildSpecification::new("builder:latest", "registry/app:v2", "ubi8/ubi-minimal")
        .with_label("description", "it's \"quoted\"; rm -rf / $(whoami) `id`\nsecond line")
        .with_env("PS1", "'$ '")
        .with_directory("/opt/app's dir:/app")
        .with_entrypoint(["/bin/sh", "-c", "echo \"$HOME\" && exit 0"]);

    let mut strategy = BuildStrategy::new("kaniko", BuildStrategySpec::default());
    amend_build_strategy(&mut strategy, &build, &RuntimeImageConfig::default()).unwrap();

    let script = &strategy.build_steps().as_slice()[0].args.as_ref().unwrap()[2];
    let expected = render_dockerfile(&build).unwrap();
    assert_eq!(written_dockerfile(script), expected.as_str());
    assert!(!script.contains("whoami"));
}

#[test]
fn test_custom_config_flows_into_steps() {
    let config = RuntimeImageConfig::default()
        .with_workspace_dir("/workspace/repo")
        .with_build_tool_image("registry.local/kaniko/executor:v1.9.1")
        .with_docker_config_dir("/builder/home/.docker");
    let build = fixture_build().with_context_dir("docs");

    let mut strategy = BuildStrategy::new("kaniko", BuildStrategySpec::default());
    amend_build_strategy(&mut strategy, &build, &config).unwrap();

    let steps = strategy.build_steps().as_slice();
    assert_eq!(steps[0].working_dir.as_deref(), Some("/workspace/repo"));
    assert!(steps[0].args.as_ref().unwrap()[2].ends_with("> /workspace/repo/Dockerfile.runtime"));

    let push = &steps[1];
    assert_eq!(push.image.as_deref(), Some("registry.local/kaniko/executor:v1.9.1"));
    let args = push.args.as_ref().unwrap();
    assert!(args.contains(&"--context=/workspace/repo/docs".to_string()));
    assert!(args.contains(&"--dockerfile=/workspace/repo/Dockerfile.runtime".to_string()));
    let docker_config = push
        .env
        .as_ref()
        .unwrap()
        .iter()
        .find(|e| e.name == "DOCKER_CONFIG")
        .and_then(|e| e.value.clone());
    assert_eq!(docker_config.as_deref(), Some("/builder/home/.docker"));
}

#[test]
fn test_json_and_yaml_builds_are_equivalent() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("build.json");
    fs::write(&json_path, serde_json::to_string(&fixture_build()).unwrap()).unwrap();

    let from_json: BuildSpecification =
        serde_yaml::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(from_json, fixture_build());
    assert_eq!(
        render_dockerfile(&from_json).unwrap(),
        render_dockerfile(&fixture_build()).unwrap()
    );
}
