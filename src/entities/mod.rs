pub mod ride;

pub use ride::{Coordinate, RideRequest};
