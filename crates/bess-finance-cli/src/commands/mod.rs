pub mod irr;
pub mod model;
pub mod sensitivity;
