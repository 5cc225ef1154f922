use crate::pipeline::steps::RuntimeSteps;
use k8s_openapi::api::core::v1::Container;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

pub const STRATEGY_API_VERSION: &str = "build.dev/v1alpha1";
pub const BUILD_STRATEGY_KIND: &str = "BuildStrategy";
pub const CLUSTER_BUILD_STRATEGY_KIND: &str = "ClusterBuildStrategy";

/// Ordered steps of a build strategy.
///
/// Existing steps are read-only. The only mutation is appending a
/// [`RuntimeSteps`] pair, so generated steps always land at the end as a
/// contiguous pair and earlier steps are never reordered or dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildSteps(Vec<Container>);

impl BuildSteps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Container> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Container] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Container> {
        self.0
    }

    /// Appends the Dockerfile-write step followed by the build-and-push step.
    pub fn append_runtime_steps(&mut self, steps: RuntimeSteps) {
        self.0.extend(steps.into_steps());
    }
}

impl From<Vec<Container>> for BuildSteps {
    fn from(steps: Vec<Container>) -> Self {
        Self(steps)
    }
}

impl<'a> IntoIterator for &'a BuildSteps {
    type Item = &'a Container;
    type IntoIter = std::slice::Iter<'a, Container>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Anything exposing a build-step list the runtime steps can be appended to.
pub trait HasBuildSteps {
    fn build_steps(&self) -> &BuildSteps;
    fn build_steps_mut(&mut self) -> &mut BuildSteps;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStrategySpec {
    #[serde(default)]
    pub build_steps: BuildSteps,
}

impl HasBuildSteps for BuildStrategySpec {
    fn build_steps(&self) -> &BuildSteps {
        &self.build_steps
    }

    fn build_steps_mut(&mut self) -> &mut BuildSteps {
        &mut self.build_steps
    }
}

macro_rules! strategy_kind {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            pub api_version: String,
            pub kind: String,
            #[serde(default)]
            pub metadata: ObjectMeta,
            #[serde(default)]
            pub spec: BuildStrategySpec,
        }

        impl $name {
            pub fn new(name: impl Into<String>, spec: BuildStrategySpec) -> Self {
                Self {
                    api_version: STRATEGY_API_VERSION.to_string(),
                    kind: $kind.to_string(),
                    metadata: ObjectMeta {
                        name: Some(name.into()),
                        ..Default::default()
                    },
                    spec,
                }
            }

            pub fn name(&self) -> &str {
                self.metadata.name.as_deref().unwrap_or_default()
            }
        }

        impl HasBuildSteps for $name {
            fn build_steps(&self) -> &BuildSteps {
                &self.spec.build_steps
            }

            fn build_steps_mut(&mut self) -> &mut BuildSteps {
                &mut self.spec.build_steps
            }
        }
    };
}

strategy_kind!(
    /// Namespace-scoped build strategy.
    BuildStrategy,
    BUILD_STRATEGY_KIND
);

strategy_kind!(
    /// Cluster-wide build strategy.
    ClusterBuildStrategy,
    CLUSTER_BUILD_STRATEGY_KIND
);

/// Either strategy scope, picked by the document's `kind`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnyBuildStrategy {
    Namespaced(BuildStrategy),
    Cluster(ClusterBuildStrategy),
}

impl AnyBuildStrategy {
    pub fn kind(&self) -> &str {
        match self {
            Self::Namespaced(s) => &s.kind,
            Self::Cluster(s) => &s.kind,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Namespaced(s) => s.name(),
            Self::Cluster(s) => s.name(),
        }
    }
}

impl<'de> Deserialize<'de> for AnyBuildStrategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let kind = value
            .get("kind")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);

        match kind.as_deref() {
            Some(BUILD_STRATEGY_KIND) => serde_json::from_value(value)
                .map(Self::Namespaced)
                .map_err(D::Error::custom),
            Some(CLUSTER_BUILD_STRATEGY_KIND) => serde_json::from_value(value)
                .map(Self::Cluster)
                .map_err(D::Error::custom),
            Some(other) => Err(D::Error::custom(format!(
                "unsupported strategy kind '{}', expected {} or {}",
                other, BUILD_STRATEGY_KIND, CLUSTER_BUILD_STRATEGY_KIND
            ))),
            None => Err(D::Error::missing_field("kind")),
        }
    }
}

impl HasBuildSteps for AnyBuildStrategy {
    fn build_steps(&self) -> &BuildSteps {
        match self {
            Self::Namespaced(s) => s.build_steps(),
            Self::Cluster(s) => s.build_steps(),
        }
    }

    fn build_steps_mut(&mut self) -> &mut BuildSteps {
        match self {
            Self::Namespaced(s) => s.build_steps_mut(),
            Self::Cluster(s) => s.build_steps_mut(),
        }
    }
}
