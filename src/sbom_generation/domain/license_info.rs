/// LicenseInfo value object wrapping a license expression as declared by a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseInfo {
    expression: String,
}

impl LicenseInfo {
    /// Returns `None` for empty input and for the SPDX sentinels
    /// `NOASSERTION` / `NONE`, which carry no license identifier.
    pub fn new(expression: &str) -> Option<Self> {
        let expression = expression.trim();
        if expression.is_empty() || expression == "NOASSERTION" || expression == "NONE" {
            return None;
        }
        Some(Self {
            expression: expression.to_string(),
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The expression in canonical SPDX form, `None` when it is not SPDX.
    ///
    /// Lax input is accepted: lowercase operators, `/` for `OR` and common
    /// imprecise names such as `apache2`.
    pub fn canonical_expression(&self) -> Option<String> {
        self.parse().map(|expr| expr.as_ref().to_string())
    }

    /// SPDX license identifiers referenced by the expression, in order of
    /// appearance and without duplicates. Unparsable expressions yield nothing.
    pub fn license_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        if let Some(expr) = self.parse() {
            for req in expr.requirements() {
                if let spdx::LicenseItem::Spdx { id, .. } = req.req.license {
                    let name = id.name.to_string();
                    if !ids.contains(&name) {
                        ids.push(name);
                    }
                }
            }
        }
        ids
    }

    fn parse(&self) -> Option<spdx::Expression> {
        let canonical = match spdx::Expression::canonicalize(&self.expression) {
            Ok(Some(canonical)) => canonical,
            Ok(None) => self.expression.clone(),
            Err(_) => return None,
        };
        spdx::Expression::parse(&canonical).ok()
    }
}
