use super::manifest::{parse_xml, read_required};
use super::ToolRunner;
use crate::ports::outbound::EcosystemAdapter;
use crate::sbom_generation::domain::{Ecosystem, Module, Supplier};
use crate::sbom_generation::policies::LicensePriority;
use crate::shared::error::SbomError;
use crate::shared::security::read_manifest;
use crate::shared::Result;
use async_trait::async_trait;
use roxmltree::Node;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

const POM_XML: &str = "pom.xml";
const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name(tag))
}

fn child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|c| c.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Project coordinates and direct dependencies of a `pom.xml`
#[derive(Debug, Default)]
struct Pom {
    group_id: String,
    artifact_id: String,
    version: String,
    url: Option<String>,
    organization: Option<String>,
    licenses: Vec<String>,
    dependencies: Vec<(String, String, String)>,
}

impl Pom {
    fn parse(document: &roxmltree::Document<'_>) -> std::result::Result<Self, String> {
        let project = document.root_element();
        let parent = child(project, "parent");

        let mut properties: HashMap<String, String> = HashMap::new();
        if let Some(props) = child(project, "properties") {
            for prop in props.children().filter(Node::is_element) {
                if let Some(value) = prop.text() {
                    properties.insert(prop.tag_name().name().to_string(), value.trim().to_string());
                }
            }
        }

        let inherited = |tag: &str| {
            child_text(project, tag).or_else(|| parent.and_then(|p| child_text(p, tag)))
        };
        let group_id = inherited("groupId").unwrap_or_default();
        let artifact_id = child_text(project, "artifactId")
            .ok_or_else(|| "no artifactId found in pom.xml".to_string())?;
        let version = inherited("version").unwrap_or_default();

        properties.insert("project.groupId".to_string(), group_id.clone());
        properties.insert("project.artifactId".to_string(), artifact_id.clone());
        properties.insert("project.version".to_string(), version.clone());
        let substitute = |value: String| substitute_properties(&value, &properties);

        let mut dependencies = Vec::new();
        if let Some(deps) = child(project, "dependencies") {
            for dep in deps.children().filter(|c| c.has_tag_name("dependency")) {
                if child_text(dep, "scope").as_deref() == Some("test") {
                    continue;
                }
                let (Some(group), Some(artifact)) =
                    (child_text(dep, "groupId"), child_text(dep, "artifactId"))
                else {
                    continue;
                };
                let version = child_text(dep, "version").map(substitute).unwrap_or_default();
                dependencies.push((substitute(group), substitute(artifact), version));
            }
        }

        let licenses = child(project, "licenses")
            .map(|ls| {
                ls.children()
                    .filter(|l| l.has_tag_name("license"))
                    .filter_map(|l| child_text(l, "name"))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Pom {
            group_id: substitute(group_id.clone()),
            artifact_id: substitute(artifact_id.clone()),
            version: substitute(version.clone()),
            url: child_text(project, "url"),
            organization: child(project, "organization").and_then(|o| child_text(o, "name")),
            licenses,
            dependencies,
        })
    }
}

/// Replaces `${name}` references with known property values; unknown
/// references are left untouched.
fn substitute_properties(value: &str, properties: &HashMap<String, String>) -> String {
    let mut result = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match properties.get(name) {
                    Some(v) => result.push_str(v),
                    None => {
                        result.push_str("${");
                        result.push_str(name);
                        result.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}

/// First `<mirror><url>` of a Maven `settings.xml`
fn mirror_url(document: &roxmltree::Document<'_>) -> Option<String> {
    document
        .descendants()
        .filter(|n| n.has_tag_name("mirror"))
        .find_map(|m| child_text(m, "url"))
        .map(|url| url.trim_end_matches('/').to_string())
}

/// Maven adapter reading `pom.xml` (direct dependencies only)
///
/// An alternate global `settings.xml` may be supplied at initialization;
/// its first mirror replaces Maven Central in download locations. Every
/// `initialize` call replaces the mirror of the previous run.
pub struct MavenAdapter {
    runner: ToolRunner,
    mirror: RwLock<Option<String>>,
}

impl MavenAdapter {
    pub const NAME: &'static str = "maven";

    pub fn new(runner: ToolRunner) -> Self {
        Self {
            runner,
            mirror: RwLock::new(None),
        }
    }

    fn repository(&self) -> String {
        let mirror = self.mirror.read().unwrap_or_else(|e| e.into_inner());
        mirror.clone().unwrap_or_else(|| MAVEN_CENTRAL.to_string())
    }

    fn set_mirror(&self, url: Option<String>) {
        *self.mirror.write().unwrap_or_else(|e| e.into_inner()) = url;
    }

    fn read_pom(dir: &Path) -> Result<Pom> {
        let content = read_required(Self::NAME, dir, POM_XML)?;
        let document = parse_xml(dir, POM_XML, &content)?;
        Pom::parse(&document).map_err(|details| {
            SbomError::ManifestParse {
                path: dir.join(POM_XML),
                details,
            }
            .into()
        })
    }

    fn artifact_module(&self, group: &str, artifact: &str, version: &str) -> Module {
        let location = (!group.is_empty() && !version.is_empty() && !version.contains("${")).then(|| {
            format!(
                "{}/{}/{}/{}/{}-{}.jar",
                self.repository(),
                group.replace('.', "/"),
                artifact,
                version,
                artifact,
                version
            )
        });
        Module::new(Ecosystem::Maven, maven_name(group, artifact), version)
            .with_download_location(location)
    }

    fn root_module(&self, pom: &Pom) -> Module {
        Module::new(
            Ecosystem::Maven,
            maven_name(&pom.group_id, &pom.artifact_id),
            &pom.version,
        )
        .with_declared_license(LicensePriority::from_alternatives(&pom.licenses))
        .with_supplier(pom.organization.clone().map(Supplier::organization))
        .with_homepage(pom.url.clone())
    }
}

/// `groupId:artifactId`, or the bare artifact when the group is unknown
fn maven_name(group: &str, artifact: &str) -> String {
    if group.is_empty() {
        artifact.to_string()
    } else {
        format!("{}:{}", group, artifact)
    }
}

#[async_trait]
impl EcosystemAdapter for MavenAdapter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Maven
    }

    fn initialize(&self, auxiliary_settings: Option<&Path>) -> Result<()> {
        let Some(settings) = auxiliary_settings else {
            self.set_mirror(None);
            return Ok(());
        };

        let content = read_manifest(settings).map_err(|e| SbomError::Configuration {
            message: format!("invalid Maven global settings {}: {}", settings.display(), e),
        })?;
        let document = roxmltree::Document::parse(&content).map_err(|e| SbomError::Configuration {
            message: format!("invalid Maven global settings {}: {}", settings.display(), e),
        })?;

        let mirror = mirror_url(&document);
        if let Some(url) = &mirror {
            tracing::debug!(mirror = %url, "Using Maven mirror from global settings");
        }
        self.set_mirror(mirror);
        Ok(())
    }

    fn is_applicable(&self, dir: &Path) -> Result<bool> {
        Ok(dir.join(POM_XML).is_file())
    }

    async fn get_root_module(&self, dir: &Path) -> Result<Module> {
        let pom = Self::read_pom(dir)?;
        Ok(self.root_module(&pom))
    }

    async fn list_modules_with_dependencies(&self, dir: &Path) -> Result<Vec<Module>> {
        let pom = Self::read_pom(dir)?;
        let mut root = self.root_module(&pom);

        let mut modules = Vec::new();
        for (group, artifact, version) in &pom.dependencies {
            let module = self.artifact_module(group, artifact, version);
            root.add_dependency(module.key());
            modules.push(module);
        }
        modules.insert(0, root);
        Ok(modules)
    }

    async fn get_tool_version(&self) -> Result<String> {
        self.runner.version(Self::NAME, "mvn").await
    }
}
