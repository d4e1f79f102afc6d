//! The two lattices error specifications are expressed and combined over: the finite
//! [`sign`] lattice that specifications and checks are stated in, and the continuous
//! [`confidence`] lattice an (out of scope, external) inference step would produce before
//! projecting down to a single sign element.

pub mod confidence;
pub mod sign;

pub use confidence::ConfidenceElement;
pub use sign::SignLatticeElement;
