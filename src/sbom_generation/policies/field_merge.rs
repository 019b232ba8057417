use crate::sbom_generation::domain::Module;

/// FieldMerge policy for modules that several subgraphs report under the same key
///
/// Rules:
/// - scalar fields: the first non-empty value wins (callers merge in adapter
///   registration order, so the earliest adapter has precedence)
/// - dependency lists: union, preserving first-seen order
/// - root flag: OR
pub struct FieldMerge;

impl FieldMerge {
    /// Folds `incoming` into `existing`.
    pub fn merge_into(existing: &mut Module, incoming: Module) {
        fill(&mut existing.declared_license, incoming.declared_license);
        fill(&mut existing.concluded_license, incoming.concluded_license);
        fill(&mut existing.supplier, incoming.supplier);
        fill(&mut existing.download_location, incoming.download_location);
        fill(&mut existing.homepage, incoming.homepage);
        fill(&mut existing.checksum, incoming.checksum);
        fill(&mut existing.package_url, incoming.package_url);

        existing.root |= incoming.root;

        for dep in incoming.dependencies {
            existing.add_dependency(dep);
        }
    }
}

fn fill<T>(slot: &mut Option<T>, candidate: Option<T>) {
    if slot.is_none() {
        *slot = candidate;
    }
}
