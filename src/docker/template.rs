use crate::build_spec::BuildSpecification;
use crate::constants::RUNTIME_DOCKERFILE;
use crate::docker::directory::parse_directory;
use crate::docker::entrypoint::render_entrypoint;
use crate::error::{Result, RuntimeImageError};
use base64::Engine;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tera::{Context, Tera, Value};

/// Runtime Dockerfile template. The first stage only exists so the final
/// stage can `COPY --from=builder`; every section after the second `FROM` is
/// optional and emitted only when its field is non-empty.
pub const RUNTIME_DOCKERFILE_TEMPLATE: &str = r#"FROM {{ output_image }} as builder

FROM {{ runtime.base_image }}
{%- for key, value in runtime.env %}
ENV {{ key }}="{{ value }}"
{%- endfor %}
{%- for key, value in runtime.labels %}
LABEL {{ key }}="{{ value }}"
{%- endfor %}
{%- for directory in runtime.directories %}
{%- set mapping = directory_mapping(token=directory) %}
COPY --from=builder "{{ mapping.source }}" "{{ mapping.destination }}"
{%- endfor %}
{%- if runtime.work_dir %}
WORKDIR "{{ runtime.work_dir }}"
{%- endif %}
{%- if runtime.entrypoint %}
ENTRYPOINT [ {{ render_entrypoint(tokens=runtime.entrypoint) }} ]
{%- endif -%}
"#;

/// Rendered runtime Dockerfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dockerfile(String);

impl Dockerfile {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Standard base64 of the Dockerfile bytes. The alphabet has no shell
    /// metacharacters, so the result can be single-quoted in a script as is.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.as_bytes())
    }
}

impl fmt::Display for Dockerfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize)]
struct TemplateContext<'a> {
    output_image: &'a str,
    runtime: RuntimeContext<'a>,
}

#[derive(Serialize)]
struct RuntimeContext<'a> {
    base_image: &'a str,
    env: &'a BTreeMap<String, String>,
    labels: &'a BTreeMap<String, String>,
    directories: &'a [String],
    work_dir: &'a str,
    entrypoint: &'a [String],
}

impl<'a> From<&'a BuildSpecification> for TemplateContext<'a> {
    fn from(spec: &'a BuildSpecification) -> Self {
        Self {
            output_image: &spec.output_image_url,
            runtime: RuntimeContext {
                base_image: &spec.runtime_base_image_url,
                env: &spec.runtime_env,
                labels: &spec.runtime_labels,
                directories: &spec.runtime_directories,
                work_dir: spec.work_dir().unwrap_or_default(),
                entrypoint: &spec.runtime_entrypoint,
            },
        }
    }
}

/// `directory_mapping(token=...)`: `{source, destination}` of a directory token.
fn directory_mapping_fn(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let token = args
        .get("token")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg("directory_mapping expects a string argument 'token'"))?;
    tera::to_value(parse_directory(token)).map_err(|e| tera::Error::msg(e.to_string()))
}

/// `render_entrypoint(tokens=[...])`: quoted, comma separated command tokens.
fn render_entrypoint_fn(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let tokens = match args.get("tokens") {
        Some(v) => tera::from_value::<Vec<String>>(v.clone())
            .map_err(|_| tera::Error::msg("render_entrypoint expects 'tokens' to be a list of strings"))?,
        None => return Err(tera::Error::msg("render_entrypoint needs the argument 'tokens'")),
    };
    Ok(Value::String(render_entrypoint(&tokens)))
}

/// Compiled runtime Dockerfile template with its helper functions registered.
pub struct DockerfileTemplate {
    tera: Tera,
}

impl DockerfileTemplate {
    pub fn new() -> Result<Self> {
        Self::with_source(RUNTIME_DOCKERFILE_TEMPLATE)
    }

    /// Compiles `source` in place of the built-in template.
    pub fn with_source(source: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.register_function("directory_mapping", directory_mapping_fn);
        tera.register_function("render_entrypoint", render_entrypoint_fn);
        tera.add_raw_template(RUNTIME_DOCKERFILE, source)
            .map_err(RuntimeImageError::TemplateConstruction)?;
        Ok(Self { tera })
    }

    /// Renders the Dockerfile for `spec`. Identical specifications always
    /// render byte-identical text.
    pub fn render(&self, spec: &BuildSpecification) -> Result<Dockerfile> {
        spec.validate()?;

        let context = Context::from_serialize(TemplateContext::from(spec))
            .map_err(|e| RuntimeImageError::Serialization(e.to_string()))?;
        let text = self
            .tera
            .render(RUNTIME_DOCKERFILE, &context)
            .map_err(RuntimeImageError::TemplateExecution)?;

        tracing::debug!(
            base_image = %spec.runtime_base_image_url,
            env = spec.runtime_env.len(),
            labels = spec.runtime_labels.len(),
            directories = spec.runtime_directories.len(),
            size_bytes = text.len(),
            "Rendered runtime Dockerfile"
        );
        Ok(Dockerfile(text))
    }
}

/// Renders the runtime Dockerfile with the built-in template.
pub fn render_dockerfile(spec: &BuildSpecification) -> Result<Dockerfile> {
    DockerfileTemplate::new()?.render(spec)
}
