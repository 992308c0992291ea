// Domain layer: registry models and the seams (traits) the core is built against.

pub mod model;
pub mod ports;
