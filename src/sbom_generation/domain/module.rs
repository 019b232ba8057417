use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Package ecosystem a module was discovered in.
///
/// Adapters for different package managers of the same registry share an
/// ecosystem (npm and yarn both produce `Npm` modules), which lets identical
/// packages found by both collapse into one graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Npm,
    Cargo,
    Go,
    PyPi,
    Composer,
    Maven,
    NuGet,
    RubyGems,
    /// Placeholder for dependency references no adapter could resolve
    Unknown,
}

impl Ecosystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::Cargo => "cargo",
            Ecosystem::Go => "go",
            Ecosystem::PyPi => "pypi",
            Ecosystem::Composer => "composer",
            Ecosystem::Maven => "maven",
            Ecosystem::NuGet => "nuget",
            Ecosystem::RubyGems => "gem",
            Ecosystem::Unknown => "unknown",
        }
    }

    /// Package URL type, `None` for placeholders
    pub fn purl_type(&self) -> Option<&'static str> {
        match self {
            Ecosystem::Npm => Some("npm"),
            Ecosystem::Cargo => Some("cargo"),
            Ecosystem::Go => Some("golang"),
            Ecosystem::PyPi => Some("pypi"),
            Ecosystem::Composer => Some("composer"),
            Ecosystem::Maven => Some("maven"),
            Ecosystem::NuGet => Some("nuget"),
            Ecosystem::RubyGems => Some("gem"),
            Ecosystem::Unknown => None,
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite identity of a module: (ecosystem, name, version)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleKey {
    pub ecosystem: Ecosystem,
    pub name: String,
    pub version: String,
}

impl ModuleKey {
    pub fn new(ecosystem: Ecosystem, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            ecosystem,
            name: name.into(),
            version: version.into(),
        }
    }

    /// Key of the placeholder that stands in for this reference when unresolved
    pub fn as_placeholder(&self) -> Self {
        Self::new(Ecosystem::Unknown, self.name.clone(), self.version.clone())
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}:{}", self.ecosystem, self.name)
        } else {
            write!(f, "{}:{}@{}", self.ecosystem, self.name, self.version)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChecksumAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl ChecksumAlgorithm {
    /// SPDX spelling of the algorithm name
    pub fn as_spdx(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Md5 => "MD5",
            ChecksumAlgorithm::Sha1 => "SHA1",
            ChecksumAlgorithm::Sha256 => "SHA256",
            ChecksumAlgorithm::Sha384 => "SHA384",
            ChecksumAlgorithm::Sha512 => "SHA512",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace('-', "").as_str() {
            "md5" => Some(ChecksumAlgorithm::Md5),
            "sha1" => Some(ChecksumAlgorithm::Sha1),
            "sha256" => Some(ChecksumAlgorithm::Sha256),
            "sha384" => Some(ChecksumAlgorithm::Sha384),
            "sha512" => Some(ChecksumAlgorithm::Sha512),
            _ => None,
        }
    }

    fn hex_len(&self) -> usize {
        match self {
            ChecksumAlgorithm::Md5 => 32,
            ChecksumAlgorithm::Sha1 => 40,
            ChecksumAlgorithm::Sha256 => 64,
            ChecksumAlgorithm::Sha384 => 96,
            ChecksumAlgorithm::Sha512 => 128,
        }
    }
}

/// Checksum with a lowercase hex digest
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum {
    pub algorithm: ChecksumAlgorithm,
    pub value: String,
}

impl Checksum {
    /// Accepts a hex digest, returning `None` if it does not match the algorithm length.
    pub fn from_hex(algorithm: ChecksumAlgorithm, digest: &str) -> Option<Self> {
        let digest = digest.trim().to_ascii_lowercase();
        if digest.len() != algorithm.hex_len() || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self {
            algorithm,
            value: digest,
        })
    }

    /// Parses `algo:hexdigest` as used by poetry.lock and uv.lock.
    pub fn from_prefixed_hex(value: &str) -> Option<Self> {
        let (algorithm, digest) = value.split_once(':')?;
        Self::from_hex(ChecksumAlgorithm::parse(algorithm)?, digest)
    }

    /// Parses a Subresource Integrity string (`sha512-<base64>`).
    ///
    /// When several hashes are listed the strongest one wins.
    pub fn from_sri(integrity: &str) -> Option<Self> {
        integrity
            .split_whitespace()
            .filter_map(|entry| {
                let (algorithm, encoded) = entry.split_once('-')?;
                let algorithm = ChecksumAlgorithm::parse(algorithm)?;
                Self::from_base64(algorithm, encoded)
            })
            .max_by_key(|c| c.algorithm.hex_len())
    }

    /// Decodes a base64 digest (NuGet `contentHash`, npm integrity payloads)
    pub fn from_base64(algorithm: ChecksumAlgorithm, encoded: &str) -> Option<Self> {
        let bytes = STANDARD.decode(encoded.trim()).ok()?;
        Self::from_hex(algorithm, &hex::encode(bytes))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupplierKind {
    Person,
    Organization,
}

/// Package supplier as rendered in the SPDX `PackageSupplier` field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Supplier {
    pub kind: SupplierKind,
    pub name: String,
}

impl Supplier {
    pub fn organization(name: impl Into<String>) -> Self {
        Self {
            kind: SupplierKind::Organization,
            name: name.into(),
        }
    }

    /// Builds a person supplier from an author string such as
    /// `Jane Doe <jane@example.com> (https://example.com)`.
    ///
    /// The email is kept in parentheses as SPDX expects; URLs are dropped.
    pub fn person_from_author(author: &str) -> Option<Self> {
        let name_end = author.find(['<', '(']).unwrap_or(author.len());
        let name = author[..name_end].trim();
        if name.is_empty() {
            return None;
        }

        let email = author
            .split_once('<')
            .and_then(|(_, rest)| rest.split_once('>'))
            .map(|(email, _)| email.trim())
            .filter(|email| !email.is_empty());

        let name = match email {
            Some(email) => format!("{} ({})", name, email),
            None => name.to_string(),
        };

        Some(Self {
            kind: SupplierKind::Person,
            name,
        })
    }
}

impl fmt::Display for Supplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SupplierKind::Person => write!(f, "Person: {}", self.name),
            SupplierKind::Organization => write!(f, "Organization: {}", self.name),
        }
    }
}

/// One discovered dependency unit.
///
/// Optional fields stay `None` when the adapter has no data; the document
/// assembler renders them as `NOASSERTION`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub ecosystem: Ecosystem,
    pub name: String,
    pub version: String,
    pub declared_license: Option<String>,
    pub concluded_license: Option<String>,
    pub supplier: Option<Supplier>,
    pub download_location: Option<String>,
    pub homepage: Option<String>,
    pub checksum: Option<Checksum>,
    pub package_url: Option<String>,
    pub root: bool,
    pub dependencies: Vec<ModuleKey>,
}

impl Module {
    pub fn new(ecosystem: Ecosystem, name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        let version = version.into();
        let package_url = package_url(ecosystem, &name, &version);
        Self {
            ecosystem,
            name,
            version,
            declared_license: None,
            concluded_license: None,
            supplier: None,
            download_location: None,
            homepage: None,
            checksum: None,
            package_url,
            root: false,
            dependencies: Vec::new(),
        }
    }

    /// External module standing in for an unresolved dependency reference
    pub fn placeholder(reference: &ModuleKey) -> Self {
        let key = reference.as_placeholder();
        Self::new(key.ecosystem, key.name, key.version)
    }

    pub fn key(&self) -> ModuleKey {
        ModuleKey::new(self.ecosystem, self.name.clone(), self.version.clone())
    }

    pub fn is_placeholder(&self) -> bool {
        self.ecosystem == Ecosystem::Unknown
    }

    pub fn as_root(mut self) -> Self {
        self.root = true;
        self
    }

    pub fn with_declared_license(mut self, license: Option<String>) -> Self {
        self.declared_license = non_empty(license);
        self
    }

    pub fn with_supplier(mut self, supplier: Option<Supplier>) -> Self {
        self.supplier = supplier;
        self
    }

    pub fn with_download_location(mut self, location: Option<String>) -> Self {
        self.download_location = non_empty(location);
        self
    }

    pub fn with_homepage(mut self, homepage: Option<String>) -> Self {
        self.homepage = non_empty(homepage);
        self
    }

    pub fn with_checksum(mut self, checksum: Option<Checksum>) -> Self {
        self.checksum = checksum;
        self
    }

    /// Appends a dependency key, ignoring duplicates and self references
    pub fn add_dependency(&mut self, key: ModuleKey) {
        if key != self.key() && !self.dependencies.contains(&key) {
            self.dependencies.push(key);
        }
    }
}

/// Treats empty and whitespace-only strings as missing
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Builds a package URL (`pkg:type/namespace/name@version`).
fn package_url(ecosystem: Ecosystem, name: &str, version: &str) -> Option<String> {
    let purl_type = ecosystem.purl_type()?;
    if name.is_empty() {
        return None;
    }

    let path = match ecosystem {
        // groupId:artifactId
        Ecosystem::Maven => match name.split_once(':') {
            Some((group, artifact)) => format!(
                "{}/{}",
                urlencoding::encode(group),
                urlencoding::encode(artifact)
            ),
            None => urlencoding::encode(name).into_owned(),
        },
        // Scoped npm packages, composer vendor/name and Go module paths
        // keep their slashes as namespace separators.
        _ => name
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/"),
    };

    if version.is_empty() {
        Some(format!("pkg:{}/{}", purl_type, path))
    } else {
        Some(format!(
            "pkg:{}/{}@{}",
            purl_type,
            path,
            urlencoding::encode(version)
        ))
    }
}
