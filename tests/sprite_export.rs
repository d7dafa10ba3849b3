//! End-to-end tests for sprite sheet export through the public API

use std::fs;
use std::path::Path;

use image::{Rgba, RgbaImage};
use tempfile::TempDir;
use tilesmith::export::{
    build_sprite_document, resource_path, write_sprite_resource, IdGen, SpriteDocument, SpriteLayout, WriteOutcome,
};
use tilesmith::params::Params;
use tilesmith::transforms::{self, Extra, Transform, TransformContext};

const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
const DARK: Rgba<u8> = Rgba([7, 24, 33, 255]);

/// Walk cycle: four 16x16 frames, two tiles wide, where frame 2 mirrors frame 0
/// and frame 3 is empty background.
fn walk_cycle() -> RgbaImage {
    let mut image = RgbaImage::from_pixel(64, 16, GREEN);
    let mut draw = |frame: u32, mirror: bool| {
        for (x, y) in [(1, 1), (2, 5), (9, 3), (14, 12), (12, 2)] {
            let x = if mirror { 15 - x } else { x };
            image.put_pixel(frame * 16 + x, y, DARK);
        }
    };
    draw(0, false);
    draw(1, false);
    draw(2, true);
    image
}

fn layout(dedup: bool) -> SpriteLayout {
    let mut params = Params::parse("name=walker htiles=2");
    if dedup {
        params.set("dedup", "true");
    }
    SpriteLayout::from_params(&params, None).expect("layout should parse")
}

#[test]
fn test_walk_cycle_document() {
    let doc = build_sprite_document(&walk_cycle(), &layout(false), &mut IdGen::sequential("w"))
        .expect("document should build");

    assert_eq!(doc.num_frames, 4);
    assert_eq!(doc.canvas_width, 16);
    assert_eq!(doc.canvas_height, 16);
    let frames = &doc.states[0].animations[0].frames;
    assert_eq!(frames.iter().map(|f| f.tiles.len()).collect::<Vec<_>>(), vec![2, 2, 2, 0]);
    assert_eq!(doc.num_tiles, 6);
    assert!(doc.tiles().all(|t| !t.flip_x && !t.flip_y));
}

#[test]
fn test_walk_cycle_dedup_reuses_mirrored_tiles() {
    let doc = build_sprite_document(&walk_cycle(), &layout(true), &mut IdGen::sequential("w"))
        .expect("document should build");

    let frames = &doc.states[0].animations[0].frames;
    let second = &frames[1].tiles;
    assert_eq!((second[0].slice_x, second[1].slice_x), (0, 8));

    // The mirrored frame points at the swapped halves of frame 0
    let third = &frames[2].tiles;
    assert_eq!((third[0].slice_x, third[0].flip_x), (8, true));
    assert_eq!((third[1].slice_x, third[1].flip_x), (0, true));
    assert_eq!(third[0].x, 0);
    assert_eq!(third[1].x, 8);
}

#[test]
fn test_resource_rewrite_keeps_identity_and_backs_up() {
    let temp = TempDir::new().expect("should create temp dir");
    let path = resource_path(Path::new("sheets/walker.png"), false, temp.path());

    let first = build_sprite_document(&walk_cycle(), &layout(false), &mut IdGen::uuid()).expect("should build");
    let outcome = write_sprite_resource(&first, &path, false).expect("first write should succeed");
    assert!(matches!(outcome, WriteOutcome::Written { existing: false, backup: None, .. }));

    let second = build_sprite_document(&walk_cycle(), &layout(true), &mut IdGen::uuid()).expect("should build");
    assert_ne!(first.id, second.id);

    let skipped = write_sprite_resource(&second, &path, false).expect("skip should succeed");
    assert!(!skipped.is_written());

    let outcome = write_sprite_resource(&second, &path, true).expect("overwrite should succeed");
    let WriteOutcome::Written { existing: true, backup: Some(backup), .. } = outcome else {
        panic!("expected an overwrite with backup");
    };
    assert!(backup.exists());

    let written: SpriteDocument =
        serde_json::from_str(&fs::read_to_string(&path).expect("should read resource")).expect("should parse");
    assert_eq!(written.id, first.id);
    assert_eq!(written.states, second.states);
}

#[test]
fn test_sprite_anim_transform_ref_layout() {
    let temp = TempDir::new().expect("should create temp dir");
    let source = temp.path().join("game/assets/sprites/walk cycle.png");
    fs::create_dir_all(source.parent().expect("has parent")).expect("should create asset dir");
    walk_cycle().save(&source).expect("should save sheet");

    let transform = transforms::require("sprite-anim").expect("sprite-anim is registered");
    let params = Params::parse("write=true isref=true htiles=2");
    let out = transform
        .apply(&walk_cycle(), &params, &TransformContext::for_source(&source))
        .expect("transform should succeed");

    let expected = temp.path().join("game/project/sprites/walk_cycle.gbsres");
    assert!(expected.exists());
    let Some(Extra::Message(message)) = out.extra else { panic!("expected a message") };
    assert!(message.contains("Ref: true"));

    let doc: SpriteDocument =
        serde_json::from_str(&fs::read_to_string(expected).expect("should read")).expect("should parse");
    assert_eq!(doc.name, "walk cycle");
    assert_eq!(doc.checksum.len(), 64);
}
