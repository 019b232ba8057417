mod field_merge;
mod license_priority;

pub use field_merge::FieldMerge;
pub use license_priority::LicensePriority;
