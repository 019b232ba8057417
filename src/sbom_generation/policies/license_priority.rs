/// LicensePriority policy for picking the declared license of a manifest
///
/// Manifests often carry license data in several places. Priority order:
/// 1. license field (if non-empty and not "UNKNOWN")
/// 2. license expression field (if non-empty)
/// 3. OSI Approved license from trove classifiers, mapped to an SPDX id when known
pub struct LicensePriority;

/// Trove classifier names with an unambiguous SPDX identifier
const CLASSIFIER_SPDX_IDS: &[(&str, &str)] = &[
    ("MIT License", "MIT"),
    ("Apache Software License", "Apache-2.0"),
    ("BSD License", "BSD-3-Clause"),
    ("ISC License (ISCL)", "ISC"),
    ("Mozilla Public License 2.0 (MPL 2.0)", "MPL-2.0"),
    ("GNU General Public License v3 (GPLv3)", "GPL-3.0-only"),
    ("GNU General Public License v2 (GPLv2)", "GPL-2.0-only"),
    (
        "GNU Lesser General Public License v3 (LGPLv3)",
        "LGPL-3.0-only",
    ),
    ("Python Software Foundation License", "PSF-2.0"),
    ("The Unlicense (Unlicense)", "Unlicense"),
];

impl LicensePriority {
    /// Selects the license based on priority rules, `None` if nothing usable is present.
    pub fn select_license(
        license: Option<String>,
        license_expression: Option<String>,
        classifiers: &[String],
    ) -> Option<String> {
        license
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty() && l != "UNKNOWN")
            .or_else(|| {
                license_expression
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty())
            })
            .or_else(|| Self::extract_license_from_classifiers(classifiers))
    }

    /// Combines a list of alternative licenses (composer `license` arrays,
    /// legacy npm `licenses` entries) into one disjunctive expression.
    pub fn from_alternatives(licenses: &[String]) -> Option<String> {
        let parts: Vec<&str> = licenses
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();

        match parts.len() {
            0 => None,
            1 => Some(parts[0].to_string()),
            _ => Some(format!("({})", parts.join(" OR "))),
        }
    }

    /// Extracts the first "License :: OSI Approved :: " classifier.
    fn extract_license_from_classifiers(classifiers: &[String]) -> Option<String> {
        classifiers
            .iter()
            .find_map(|c| c.strip_prefix("License :: OSI Approved :: "))
            .map(|name| {
                CLASSIFIER_SPDX_IDS
                    .iter()
                    .find(|(classifier, _)| *classifier == name)
                    .map(|(_, id)| id.to_string())
                    .unwrap_or_else(|| name.to_string())
            })
    }
}
