//! Artifact generators: connection in, path-addressed file contents out.
//!
//! Generators never touch the disk. Writing is the job of the
//! [`WriteExecutor`](crate::WriteExecutor).

use std::path::Path;

use askama::Template;
use cmdgen_core::{
    class_name, constant_case, snake_case, AnalysisSnapshot, ArtifactDescriptor, ArtifactKind,
    Connection,
};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{OpsError, OpsResult};
use crate::schema::expand_schema;

/// Produces the artifact family for a command node.
pub trait ArtifactGenerator: Send + Sync {
    /// Generate the command schema into `target_dir`.
    ///
    /// Returns zero or one descriptor; never more.
    fn generate_schema(
        &self,
        connection: &Connection,
        snapshot: &AnalysisSnapshot,
        target_dir: &Path,
    ) -> OpsResult<Vec<ArtifactDescriptor>>;

    /// Generate the API description and command file.
    ///
    /// `schema_ref` is the schema path relative to the project base, or
    /// `None` when no schema was generated.
    fn generate_remainder(
        &self,
        connection: &Connection,
        snapshot: &AnalysisSnapshot,
        schema_ref: Option<&str>,
    ) -> OpsResult<Vec<ArtifactDescriptor>>;
}

/// Deterministic generator for event-engine style PHP projects.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    config: Config,
}

impl CommandGenerator {
    /// Create a generator for the given project layout.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn api_description(
        &self,
        connection: &Connection,
        schema_ref: Option<&str>,
    ) -> OpsResult<ArtifactDescriptor> {
        let name = &connection.node.name;
        let class = class_name(name);
        let dir = self.config.domain_root().join("Api").join("Command");
        let base_depth = self
            .config
            .relative_to_base(&dir)
            .split('/')
            .filter(|p| !p.is_empty())
            .count();

        let template = ApiDescriptionTemplate {
            namespace: &self.config.namespace,
            class_name: &class,
            constant: &constant_case(name),
            command_name: name,
            schema_ref,
            base_depth,
        };
        let content = template
            .render()
            .map_err(|e| OpsError::generation(ArtifactKind::ApiDescription, e.to_string()))?;

        Ok(ArtifactDescriptor::new(
            ArtifactKind::ApiDescription,
            dir.join(format!("{}.php", class)),
            content,
        ))
    }

    fn command_file(
        &self,
        connection: &Connection,
        snapshot: &AnalysisSnapshot,
    ) -> OpsResult<ArtifactDescriptor> {
        let name = &connection.node.name;
        let properties = match &snapshot.schema {
            Some(schema) => {
                let expanded = expand_schema(schema)
                    .map_err(|e| OpsError::generation(ArtifactKind::CommandFile, e))?;
                property_views(&expanded)
            }
            None => Vec::new(),
        };
        let events: Vec<&str> = snapshot.events.iter().map(|e| e.name.as_str()).collect();

        let template = CommandTemplate {
            namespace: &self.config.namespace,
            class_name: &class_name(name),
            command_name: name,
            aggregate: snapshot.aggregate.as_ref().map(|a| a.name.as_str()),
            events,
            properties,
        };
        let content = template
            .render()
            .map_err(|e| OpsError::generation(ArtifactKind::CommandFile, e.to_string()))?;

        Ok(ArtifactDescriptor::new(
            ArtifactKind::CommandFile,
            self.config
                .domain_root()
                .join("Command")
                .join(format!("{}.php", snake_case(name))),
            content,
        ))
    }
}

impl ArtifactGenerator for CommandGenerator {
    fn generate_schema(
        &self,
        connection: &Connection,
        snapshot: &AnalysisSnapshot,
        target_dir: &Path,
    ) -> OpsResult<Vec<ArtifactDescriptor>> {
        let Some(schema) = &snapshot.schema else {
            debug!(node = %connection.node.name, "No schema on node, skipping schema file");
            return Ok(Vec::new());
        };

        let expanded =
            expand_schema(schema).map_err(|e| OpsError::generation(ArtifactKind::Schema, e))?;
        let mut content = serde_json::to_string_pretty(&expanded)?;
        content.push('\n');

        let path = target_dir.join(format!("{}-schema.json", class_name(&connection.node.name)));
        Ok(vec![ArtifactDescriptor::new(
            ArtifactKind::Schema,
            path,
            content,
        )])
    }

    fn generate_remainder(
        &self,
        connection: &Connection,
        snapshot: &AnalysisSnapshot,
        schema_ref: Option<&str>,
    ) -> OpsResult<Vec<ArtifactDescriptor>> {
        Ok(vec![
            self.api_description(connection, schema_ref)?,
            self.command_file(connection, snapshot)?,
        ])
    }
}

/// Getter rendered into the command file.
#[derive(Debug, Clone)]
struct PropertyView {
    name: String,
    getter: String,
    php_type: String,
    optional: bool,
}

fn property_views(schema: &Value) -> Vec<PropertyView> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    properties
        .iter()
        .map(|(name, prop)| {
            let optional = !required.contains(&name.as_str());
            let base = php_type(prop);
            let php_type = if optional && base != "mixed" {
                format!("?{}", base)
            } else {
                base.to_string()
            };
            PropertyView {
                name: name.clone(),
                getter: lower_camel(name),
                php_type,
                optional,
            }
        })
        .collect()
}

fn php_type(prop: &Value) -> &'static str {
    match prop.get("type").and_then(Value::as_str) {
        Some("string") => "string",
        Some("integer") => "int",
        Some("number") => "float",
        Some("boolean") => "bool",
        Some("array") | Some("object") => "array",
        _ => "mixed",
    }
}

fn lower_camel(name: &str) -> String {
    let class = class_name(name);
    let mut chars = class.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Template)]
#[template(path = "api_description.php", escape = "none")]
struct ApiDescriptionTemplate<'a> {
    namespace: &'a str,
    class_name: &'a str,
    constant: &'a str,
    command_name: &'a str,
    schema_ref: Option<&'a str>,
    base_depth: usize,
}

#[derive(Template)]
#[template(path = "command.php", escape = "none")]
struct CommandTemplate<'a> {
    namespace: &'a str,
    class_name: &'a str,
    command_name: &'a str,
    aggregate: Option<&'a str>,
    events: Vec<&'a str>,
    properties: Vec<PropertyView>,
}
