// Domain layer: order models and the collaborator ports the core talks to.

pub mod model;
pub mod ports;
