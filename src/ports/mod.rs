/// Port traits between the generation core and the outside world
///
/// `inbound` is the generation entry point the command layer drives;
/// `outbound` covers ecosystem adapters, formatters, sinks, license texts
/// and progress output.
pub mod inbound;
pub mod outbound;
