/// Core domain: dependency graph model, merge policies and document assembly
pub mod domain;
pub mod policies;
pub mod services;
