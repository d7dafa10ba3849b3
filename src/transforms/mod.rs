//! Image transforms
//!
//! Every transform is a stateless unit struct implementing [`Transform`] and
//! registered under a kebab-case name. The CLI and the batch runner look
//! transforms up by name and apply them to one image at a time.
//!
//! # Module Structure
//!
//! - [`types`] - Transform trait, output and error definitions
//! - [`mark_unique`] - Mark first-seen and repeated background tiles
//! - [`tile_census`] - Count tile occurrences and list unique tiles
//! - [`merge_unique`] - Unique tiles across two images
//! - [`find_duplicates`] - Flip-aware sprite tile labelling
//! - [`extract_colors`] - Split extra sprite colors into palette bands
//! - [`gaps`] - Spread pixels apart
//! - [`quantize`] - Brightness/contrast grid mapped to a palette
//! - [`sprite_anim`] - Sprite sheet to animation resource

pub mod extract_colors;
pub mod find_duplicates;
pub mod gaps;
pub mod mark_unique;
pub mod merge_unique;
pub mod quantize;
pub mod sprite_anim;
pub mod tile_census;
pub mod types;

use image::RgbaImage;

use crate::params::Params;

pub use extract_colors::ExtractColors;
pub use find_duplicates::FindDuplicates;
pub use gaps::Gaps;
pub use mark_unique::MarkUnique;
pub use merge_unique::MergeUnique;
pub use quantize::Quantize;
pub use sprite_anim::SpriteAnim;
pub use tile_census::TileCensusSheet;
pub use types::{Extra, Transform, TransformContext, TransformError, TransformOutput};

/// Result type alias for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;

/// Returns the image unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Transform for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn description(&self) -> &'static str {
        "Return the image unchanged"
    }

    fn apply(&self, image: &RgbaImage, _params: &Params, _ctx: &TransformContext) -> Result<TransformOutput> {
        Ok(TransformOutput::image(image.clone()))
    }
}

static REGISTRY: [&dyn Transform; 9] = [
    &Identity,
    &MarkUnique,
    &TileCensusSheet,
    &MergeUnique,
    &FindDuplicates,
    &ExtractColors,
    &Gaps,
    &Quantize,
    &SpriteAnim,
];

/// Every registered transform, in listing order.
pub fn all() -> &'static [&'static dyn Transform] {
    &REGISTRY
}

/// Look a transform up by name.
pub fn find(name: &str) -> Option<&'static dyn Transform> {
    REGISTRY.iter().copied().find(|t| t.name() == name)
}

/// Look a transform up by name, failing with `UnknownTransform`.
pub fn require(name: &str) -> Result<&'static dyn Transform> {
    find(name).ok_or_else(|| TransformError::UnknownTransform(name.to_string()))
}

pub fn names() -> Vec<&'static str> {
    REGISTRY.iter().map(|t| t.name()).collect()
}

/// Tile edge length from the `tile` parameter, defaulting to 8.
pub(crate) fn square_tile_param(op: &str, params: &Params) -> Result<crate::tile::TileSize> {
    let edge = params.get_u32("tile", 8)?;
    crate::tile::TileSize::square(edge).map_err(|e| TransformError::invalid(op, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_and_names() {
        assert_eq!(
            names(),
            vec![
                "identity",
                "mark-unique",
                "tile-census",
                "merge-unique",
                "find-duplicates",
                "extract-colors",
                "gaps",
                "quantize",
                "sprite-anim"
            ]
        );
    }

    #[test]
    fn test_find_and_require() {
        assert_eq!(find("gaps").map(|t| t.name()), Some("gaps"));
        assert!(find("blur").is_none());
        assert!(matches!(require("blur"), Err(TransformError::UnknownTransform(_))));
    }

    #[test]
    fn test_every_transform_has_description() {
        assert!(all().iter().all(|t| !t.description().is_empty()));
    }

    #[test]
    fn test_identity() {
        let image = RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255]));
        let out = Identity.apply(&image, &Params::new(), &TransformContext::default()).unwrap();
        assert_eq!(out.image, image);
        assert!(out.save_image);
        assert!(out.extra.is_none());
    }
}
