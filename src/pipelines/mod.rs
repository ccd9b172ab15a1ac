//! Individual model-backed steps. Each step builds its prompt, calls the
//! gateway once, and validates what comes back.

pub mod illustrate;
pub mod improve;
pub mod prompt;
pub mod suggest;

pub use illustrate::generate_recipe_image;
pub use improve::improve_recipe_ideas;
pub use suggest::generate_recipes;
