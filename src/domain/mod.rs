// Domain layer: models and ports (interfaces). No HTTP or process access here.

pub mod model;
pub mod ports;
