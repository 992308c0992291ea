// Adapters layer: transport-facing glue over the registry core.

pub mod http;
