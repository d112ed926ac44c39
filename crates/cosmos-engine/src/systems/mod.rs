pub mod backdrop;
pub mod epoch;
pub mod galaxies;
pub mod landmarks;
pub mod morph_field;
pub mod motion;
pub mod nebulae;
pub mod planets;
pub mod render;
pub mod rng;
pub mod shooting_stars;
pub mod starfield;
pub mod universe;
