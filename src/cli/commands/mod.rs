mod ingredients;
mod tags;

pub use ingredients::{IngredientRecord, cmd_import_ingredients, parse_ingredients};
pub use tags::cmd_add_tag;
