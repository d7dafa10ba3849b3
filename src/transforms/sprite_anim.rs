//! Sprite sheet to GB Studio animation resource
//!
//! The image passes through unchanged and is not saved; the product is the
//! sprite document. With `write=true` the document is written as a `.gbsres`
//! resource, either into the output directory or (with `isref=true`) into
//! the project tree that mirrors the sheet's `assets` location.
//!
//! Parameters: see [`SpriteLayout::from_params`] for layout keys, plus
//! `write`, `isref`, `override`, `fname` and `ids` (`uuid` or `sequential`).

use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::info;

use super::{Result, Transform, TransformContext, TransformError, TransformOutput};
use crate::export::{build_sprite_document, resource_path, write_sprite_resource, IdGen, SpriteLayout, WriteOutcome};
use crate::params::Params;

#[derive(Debug, Clone, Copy, Default)]
pub struct SpriteAnim;

fn source_path(params: &Params, ctx: &TransformContext) -> Option<PathBuf> {
    ctx.source.clone().or_else(|| params.get_str("fname").map(PathBuf::from))
}

fn id_source(params: &Params, name: &str) -> Result<IdGen> {
    match params.get_str("ids").as_deref() {
        None | Some("uuid") => Ok(IdGen::uuid()),
        Some("sequential") => Ok(IdGen::sequential(name.replace(' ', "_"))),
        Some(other) => Err(TransformError::invalid(
            "sprite-anim",
            format!("ids must be 'uuid' or 'sequential', got '{}'", other),
        )),
    }
}

impl Transform for SpriteAnim {
    fn name(&self) -> &'static str {
        "sprite-anim"
    }

    fn description(&self) -> &'static str {
        "Describe a sprite sheet as a GB Studio sprite resource"
    }

    fn apply(&self, image: &RgbaImage, params: &Params, ctx: &TransformContext) -> Result<TransformOutput> {
        let source = source_path(params, ctx);
        let layout = SpriteLayout::from_params(params, source.as_deref())?;
        let mut ids = id_source(params, &layout.name)?;
        let doc = build_sprite_document(image, &layout, &mut ids)?;

        if !params.get_bool("write", false)? {
            let data = serde_json::to_value(&doc).map_err(crate::export::ExportError::from)?;
            return Ok(TransformOutput::image(image.clone()).with_data(data).without_save());
        }

        let Some(source) = source else {
            return Err(TransformError::invalid(self.name(), "write=true needs a source file (fname)"));
        };
        let is_ref = params.get_bool("isref", false)?;
        let overwrite = ctx.overwrite || params.get_bool("override", false)?;
        let out_dir = ctx
            .output_dir
            .clone()
            .or_else(|| source.parent().map(Path::to_path_buf))
            .unwrap_or_default();

        let path = resource_path(&source, is_ref, &out_dir);
        let message = match write_sprite_resource(&doc, &path, overwrite)? {
            WriteOutcome::Skipped { .. } => format!(
                "Skipping {}: Output file already exists and force_override is False.",
                source.display()
            ),
            WriteOutcome::Written { path, existing, .. } => {
                info!(path = %path.display(), tiles = doc.num_tiles, "sprite resource written");
                format!("Successfully wrote {}: Ref: {} Existing: {}", path.display(), is_ref, existing)
            }
        };

        Ok(TransformOutput::image(image.clone()).with_message(message).without_save())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas;
    use crate::color::rgb;
    use crate::export::{ExportError, SpriteDocument};
    use crate::transforms::Extra;

    fn sheet() -> RgbaImage {
        let mut image = canvas::blank(24, 16, rgb(7, 24, 33));
        image.put_pixel(8, 0, rgb(224, 248, 207));
        image
    }

    #[test]
    fn test_document_as_data() {
        let params = Params::parse("name=hero ids=sequential");
        let out = SpriteAnim.apply(&sheet(), &params, &TransformContext::default()).unwrap();

        assert!(!out.save_image);
        assert_eq!(out.image, sheet());
        let Some(Extra::Data(data)) = out.extra else { panic!("expected document data") };
        assert_eq!(data["numFrames"], 3);
        assert_eq!(data["numTiles"], 3);
        assert_eq!(data["id"], "hero-0");
        assert_eq!(data["checksum"], "");
    }

    #[test]
    fn test_write_resource_to_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = TransformContext {
            source: Some(dir.path().join("bat wing.png")),
            overwrite: false,
            output_dir: Some(dir.path().join("out")),
        };
        let params = Params::parse("write=true chksum=abc");

        let out = SpriteAnim.apply(&sheet(), &params, &ctx).unwrap();
        let path = dir.path().join("out/bat wing.gbsres");
        assert_eq!(
            out.message(),
            Some(format!("Successfully wrote {}: Ref: false Existing: false", path.display()).as_str())
        );

        let doc: SpriteDocument = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc.name, "bat wing");
        assert_eq!(doc.symbol, "sprite_bat_wing");
        assert_eq!(doc.checksum, "abc");

        // Second run without override is skipped
        let out = SpriteAnim.apply(&sheet(), &params, &ctx).unwrap();
        assert!(out.message().unwrap().starts_with("Skipping "));
        assert!(out.message().unwrap().ends_with("force_override is False."));
    }

    #[test]
    fn test_write_by_reference_into_project() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("assets/sprites/bat wing.png");
        let params = Params::parse("write=true isref=true override=true");

        let out = SpriteAnim.apply(&sheet(), &params, &TransformContext::for_source(&source)).unwrap();
        let expected = dir.path().join("project/sprites/bat_wing.gbsres");
        assert!(expected.exists());
        assert!(out.message().unwrap().contains("Ref: true Existing: false"));
    }

    #[test]
    fn test_write_without_source_errors() {
        let err = SpriteAnim.apply(&sheet(), &Params::parse("write=true"), &TransformContext::default());
        assert!(matches!(err, Err(TransformError::InvalidParameter { .. })));
    }

    #[test]
    fn test_bad_geometry_errors() {
        let image = canvas::blank(10, 16, rgb(1, 1, 1));
        let err = SpriteAnim.apply(&image, &Params::new(), &TransformContext::default());
        assert!(matches!(err, Err(TransformError::Export(_))));

        let err = SpriteAnim.apply(&sheet(), &Params::parse("htiles=536870912"), &TransformContext::default());
        assert!(matches!(err, Err(TransformError::Export(ExportError::Config(_)))));
    }
}
