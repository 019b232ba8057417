use crate::sbom_generation::domain::{
    DependencyGraph, ExtractedLicense, LicenseInfo, Module, ModuleKey, PackagePurpose,
    PurlReference, Relationship, SbomMetadata, SchemaVersion, SpdxDocument, SpdxPackage,
    NOASSERTION,
};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

const NAMESPACE_BASE: &str = "https://spdx.org/spdxdocs";
const DEFAULT_DOCUMENT_NAME: &str = "sbom";

/// Options that shape the assembled document
#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblyOptions {
    pub schema: SchemaVersion,
    pub include_license_text: bool,
}

/// DocumentAssembler service mapping a dependency graph to an SPDX document
///
/// Pure given its inputs: equal graphs, options, metadata and license texts
/// produce equal documents.
pub struct DocumentAssembler;

impl DocumentAssembler {
    /// # Arguments
    /// * `graph` - validated dependency graph
    /// * `options` - schema version and license text flag
    /// * `metadata` - creation info
    /// * `license_text` - resolver for full license texts by SPDX identifier
    pub fn assemble<F>(
        graph: &DependencyGraph,
        options: AssemblyOptions,
        metadata: SbomMetadata,
        license_text: F,
    ) -> SpdxDocument
    where
        F: Fn(&str) -> Option<String>,
    {
        let ids = Self::assign_spdx_ids(graph);

        let packages: Vec<SpdxPackage> = graph
            .modules()
            .map(|module| {
                let spdx_id = ids.get(&module.key()).cloned().unwrap_or_default();
                Self::to_package(module, spdx_id, options)
            })
            .collect();

        let extracted_licenses = if options.include_license_text {
            Self::extract_licenses(graph, &license_text)
        } else {
            Vec::new()
        };

        let relationships = Self::relationships(graph, &ids);

        let name = graph
            .roots()
            .first()
            .map(|root| root.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string());
        let namespace = Self::namespace(&name, &packages);

        SpdxDocument {
            schema: options.schema,
            name,
            namespace,
            metadata,
            packages,
            extracted_licenses,
            relationships,
        }
    }

    /// Assigns `SPDXRef-Package-<eco>-<name>-<version>` ids in graph order,
    /// suffixing `-2`, `-3`, ... when sanitization makes two ids collide.
    fn assign_spdx_ids(graph: &DependencyGraph) -> HashMap<ModuleKey, String> {
        let mut used: HashSet<String> = HashSet::new();
        let mut ids = HashMap::new();

        for key in graph.keys() {
            let mut parts = vec![key.ecosystem.as_str(), key.name.as_str()];
            if !key.version.is_empty() {
                parts.push(key.version.as_str());
            }
            let base = format!("SPDXRef-Package-{}", sanitize(&parts.join("-")));

            let mut candidate = base.clone();
            let mut suffix = 2;
            while used.contains(&candidate) {
                candidate = format!("{}-{}", base, suffix);
                suffix += 1;
            }

            used.insert(candidate.clone());
            ids.insert(key.clone(), candidate);
        }

        ids
    }

    fn to_package(module: &Module, spdx_id: String, options: AssemblyOptions) -> SpdxPackage {
        let (license_declared, license_concluded) = if options.include_license_text {
            (
                license_or_noassertion(module.declared_license.as_deref()),
                license_or_noassertion(module.concluded_license.as_deref()),
            )
        } else {
            (NOASSERTION.to_string(), NOASSERTION.to_string())
        };

        let copyright_text = options
            .schema
            .requires_copyright_text()
            .then(|| NOASSERTION.to_string());

        let primary_purpose = options.schema.supports_primary_purpose().then_some(
            if module.root {
                PackagePurpose::Application
            } else {
                PackagePurpose::Library
            },
        );

        SpdxPackage {
            spdx_id,
            name: module.name.clone(),
            version: module.version.clone(),
            supplier: module
                .supplier
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| NOASSERTION.to_string()),
            download_location: module
                .download_location
                .clone()
                .unwrap_or_else(|| NOASSERTION.to_string()),
            homepage: module.homepage.clone(),
            checksum: module.checksum.clone(),
            license_concluded,
            license_declared,
            copyright_text,
            primary_purpose,
            purl: module
                .package_url
                .clone()
                .map(|locator| PurlReference { locator }),
        }
    }

    /// One extracted licensing info per distinct SPDX identifier and per
    /// distinct non-SPDX license text, in first-seen order.
    ///
    /// SPDX identifiers take their text from `license_text`; a non-SPDX
    /// license keeps its original wording as the extracted text.
    fn extract_licenses<F>(graph: &DependencyGraph, license_text: &F) -> Vec<ExtractedLicense>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut extracted: Vec<ExtractedLicense> = Vec::new();
        let known = |extracted: &[ExtractedLicense], id: &str| {
            extracted.iter().any(|e| e.license_id == id)
        };

        for module in graph.modules() {
            for expression in [&module.declared_license, &module.concluded_license]
                .into_iter()
                .flatten()
            {
                let Some(info) = LicenseInfo::new(expression) else {
                    continue;
                };
                match DocumentLicense::resolve(&info) {
                    DocumentLicense::Expression(_) => {
                        for id in info.license_ids() {
                            let license_id = format!("LicenseRef-{}", sanitize(&id));
                            if known(&extracted, &license_id) {
                                continue;
                            }
                            let text = license_text(&id).unwrap_or_else(|| {
                                tracing::debug!(license = %id, "No license text available");
                                NOASSERTION.to_string()
                            });
                            extracted.push(ExtractedLicense {
                                license_id,
                                name: id,
                                text,
                            });
                        }
                    }
                    DocumentLicense::Custom(license_ref) => {
                        if !known(&extracted, &license_ref) {
                            extracted.push(ExtractedLicense {
                                license_id: license_ref,
                                name: info.expression().to_string(),
                                text: info.expression().to_string(),
                            });
                        }
                    }
                }
            }
        }

        extracted
    }

    /// DESCRIBES for every root, then DEPENDS_ON for every edge via a
    /// depth-first walk from each root followed by every unreached node.
    ///
    /// Each node is expanded once. An edge back to a node on the current path
    /// is emitted but not followed, so cycles terminate.
    fn relationships(
        graph: &DependencyGraph,
        ids: &HashMap<ModuleKey, String>,
    ) -> Vec<Relationship> {
        let id_of = |key: &ModuleKey| ids.get(key).cloned().unwrap_or_default();

        let mut relationships: Vec<Relationship> = graph
            .roots()
            .iter()
            .map(|root| Relationship::describes(id_of(root)))
            .collect();

        let mut expanded: HashSet<&ModuleKey> = HashSet::new();
        let mut on_path: HashSet<&ModuleKey> = HashSet::new();

        for start in graph.roots().iter().chain(graph.keys()) {
            if !expanded.insert(start) {
                continue;
            }
            on_path.insert(start);
            let mut stack: Vec<(&ModuleKey, usize)> = vec![(start, 0)];

            while let Some(&(key, next)) = stack.last() {
                let dependencies = graph
                    .get(key)
                    .map(|m| m.dependencies.as_slice())
                    .unwrap_or(&[]);

                let Some(dep) = dependencies.get(next) else {
                    stack.pop();
                    on_path.remove(key);
                    continue;
                };
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }

                relationships.push(Relationship::depends_on(id_of(key), id_of(dep)));

                if on_path.contains(dep) || !expanded.insert(dep) {
                    continue;
                }
                on_path.insert(dep);
                stack.push((dep, 0));
            }
        }

        relationships
    }

    fn namespace(name: &str, packages: &[SpdxPackage]) -> String {
        let joined = packages
            .iter()
            .map(|p| p.spdx_id.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let uuid = Uuid::new_v5(&Uuid::NAMESPACE_URL, joined.as_bytes());
        format!("{}/{}-{}", NAMESPACE_BASE, sanitize(name), uuid)
    }
}

/// How a module license is written into the document
enum DocumentLicense {
    /// Canonical SPDX expression
    Expression(String),
    /// `LicenseRef-` id standing in for text that is not an SPDX expression
    Custom(String),
}

impl DocumentLicense {
    fn resolve(info: &LicenseInfo) -> Self {
        match info.canonical_expression() {
            Some(canonical) => DocumentLicense::Expression(canonical),
            None => {
                tracing::debug!(license = info.expression(), "License is not an SPDX expression");
                DocumentLicense::Custom(format!("LicenseRef-{}", sanitize(info.expression())))
            }
        }
    }

    fn into_field(self) -> String {
        match self {
            DocumentLicense::Expression(value) | DocumentLicense::Custom(value) => value,
        }
    }
}

fn license_or_noassertion(license: Option<&str>) -> String {
    license
        .and_then(LicenseInfo::new)
        .map(|info| DocumentLicense::resolve(&info).into_field())
        .unwrap_or_else(|| NOASSERTION.to_string())
}

/// Replaces every character outside `[A-Za-z0-9.-]` with `-`
pub fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
