/// Application layer
///
/// Detection of projects, the generation use case, request/response DTOs
/// and the factories that wire concrete adapters together.
pub mod detection;
pub mod dto;
pub mod factories;
pub mod use_cases;
