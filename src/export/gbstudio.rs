//! GB Studio sprite resource writer.
//!
//! Resources are pretty-printed JSON files with the `.gbsres` extension.
//! When a resource already exists and may be overwritten, the old file is
//! backed up first and its identity fields are carried into the new document
//! so the editor keeps its references to the sprite.

use std::fs::File;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::export::{ExportOptions, Exporter, Result, SpriteDocument, WriteOutcome};

/// Extension of GB Studio resource files
pub const RESOURCE_EXTENSION: &str = "gbsres";

/// GB Studio sprite resource exporter.
#[derive(Debug, Default)]
pub struct GbStudioExporter;

impl GbStudioExporter {
    /// Create a new GB Studio exporter.
    pub fn new() -> Self {
        Self
    }

    /// Serialize a document to a JSON string.
    pub fn export_to_string(&self, doc: &SpriteDocument, options: &ExportOptions) -> Result<String> {
        let json = if options.pretty {
            serde_json::to_string_pretty(doc)?
        } else {
            serde_json::to_string(doc)?
        };
        Ok(json)
    }
}

impl Exporter for GbStudioExporter {
    fn export(&self, doc: &SpriteDocument, output_path: &Path, options: &ExportOptions) -> Result<()> {
        let json = self.export_to_string(doc, options)?;

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = File::create(output_path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }

    fn format_name(&self) -> &'static str {
        "gbstudio"
    }

    fn extension(&self) -> &'static str {
        RESOURCE_EXTENSION
    }
}

/// Where the resource for `source` is written.
///
/// With `is_ref` the resource lands inside the project tree that mirrors the
/// asset tree: spaces in the file name become `_` and every `assets`
/// directory becomes `project`. Otherwise it is `<stem>.gbsres` in `out_dir`.
pub fn resource_path(source: &Path, is_ref: bool, out_dir: &Path) -> PathBuf {
    if !is_ref {
        let stem = source.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        return out_dir.join(format!("{}.{}", stem, RESOURCE_EXTENSION));
    }

    let mut path = PathBuf::new();
    for component in source.parent().unwrap_or(Path::new("")).components() {
        match component {
            Component::Normal(name) if name == "assets" => path.push("project"),
            other => path.push(other.as_os_str()),
        }
    }
    let file_name = source.file_name().map(|s| s.to_string_lossy().replace(' ', "_")).unwrap_or_default();
    path.push(file_name);
    path.set_extension(RESOURCE_EXTENSION);
    path
}

/// Backup name for an existing resource: `<path><6 random chars>.bu`.
pub fn backup_path(path: &Path) -> PathBuf {
    let tag = uuid::Uuid::new_v4().simple().to_string();
    let mut name = path.as_os_str().to_os_string();
    name.push(&tag[..6]);
    name.push(".bu");
    PathBuf::from(name)
}

/// Identity fields kept from a resource that is being replaced
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreservedFields {
    #[serde(rename = "_resourceType")]
    resource_type: Option<String>,
    id: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
    filename: Option<String>,
    checksum: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

impl PreservedFields {
    fn apply(self, doc: &mut SpriteDocument) {
        macro_rules! keep {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field { doc.$field = value; })*
            };
        }
        keep!(resource_type, id, name, symbol, filename, checksum, width, height);
    }
}

/// Write `doc` to `path`, honoring an existing resource.
///
/// An existing file is left alone unless `overwrite` is set; when it is, the
/// file is backed up and its identity fields are merged into `doc` before
/// writing.
pub fn write_sprite_resource(doc: &SpriteDocument, path: &Path, overwrite: bool) -> Result<WriteOutcome> {
    let existing = path.exists();
    if existing && !overwrite {
        warn!(path = %path.display(), "resource exists, not overwriting");
        return Ok(WriteOutcome::Skipped { path: path.to_path_buf() });
    }

    let mut doc = doc.clone();
    let mut backup = None;
    if existing {
        let preserved: PreservedFields = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        let bu = backup_path(path);
        std::fs::copy(path, &bu)?;
        backup = Some(bu);
        preserved.apply(&mut doc);
    }

    GbStudioExporter::new().export(&doc, path, &ExportOptions::default())?;
    info!(path = %path.display(), existing, "wrote sprite resource");

    Ok(WriteOutcome::Written { path: path.to_path_buf(), existing, backup })
}
