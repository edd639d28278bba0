mod image;
mod text;
mod traits;

pub use image::{IMAGE_EXTENSIONS, ImageModel, has_image_extension};
pub use text::{SentimentModel, TextModel};
pub use traits::{Model, Rejection, require_non_empty};
