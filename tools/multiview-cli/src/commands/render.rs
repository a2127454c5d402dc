//! Render one frame per layout to PNG files.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use multiview_model::Value;
use multiview_processing::parse_value;
use multiview_render::{ImagePainter, MultiViewComposer};

use super::open_composer;
use crate::synthetic::camera_pattern;

pub fn run(
    path: PathBuf,
    output: PathBuf,
    font: Option<PathBuf>,
    overrides: Vec<String>,
) -> anyhow::Result<()> {
    let mut composer = open_composer(&path)?;

    if let Some(font) = font {
        let mut painter = ImagePainter::new();
        let name = composer.config().default_overlay_style.font.clone();
        painter
            .load_font(name, &font)
            .with_context(|| format!("Failed to load font {}", font.display()))?;
        composer = composer.with_painter(painter);
    } else {
        println!("No font given; overlay boxes are drawn without text.");
    }

    let fields = overrides
        .iter()
        .map(|raw| parse_override(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;
    composer.update_dynamic_data(fields);

    feed_test_patterns(&mut composer);

    std::fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let names: Vec<String> = composer.layouts().names().to_vec();
    let frames = composer.generate_frame();
    for (name, frame) in names.iter().zip(&frames) {
        let file = output.join(format!("{name}.png"));
        frame
            .save(&file)
            .with_context(|| format!("Failed to write {}", file.display()))?;
        println!("  {name}: {}x{} -> {}", frame.width(), frame.height(), file.display());
    }

    composer.shutdown();
    println!("Rendered {} frame(s) into {}", frames.len(), display_dir(&output));
    Ok(())
}

/// Give every camera a pattern at its nominal (pre-rotation) resolution.
pub fn feed_test_patterns(composer: &mut MultiViewComposer) {
    let cameras: Vec<(String, u32, u32)> = composer
        .camera_names()
        .into_iter()
        .filter_map(|name| {
            let camera = composer.camera_config(name)?;
            Some((name.to_string(), camera.resolution.width, camera.resolution.height))
        })
        .collect();

    for (index, (name, width, height)) in cameras.into_iter().enumerate() {
        composer.update_camera_image(&name, camera_pattern(width, height, index), true);
    }
}

fn parse_override(raw: &str) -> anyhow::Result<(String, Value)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Empty sensor name in '{raw}'");
    }
    Ok((name.to_string(), parse_value(value.trim())))
}

fn display_dir(path: &Path) -> String {
    if path.as_os_str().is_empty() {
        ".".to_string()
    } else {
        path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_override_types_values() {
        assert_eq!(
            parse_override("level=12").unwrap(),
            ("level".to_string(), Value::Int(12))
        );
        assert_eq!(
            parse_override("show_warning = true").unwrap(),
            ("show_warning".to_string(), Value::Bool(true))
        );
        assert_eq!(
            parse_override("msg=hot=humid").unwrap(),
            ("msg".to_string(), Value::from("hot=humid"))
        );
    }

    #[test]
    fn test_parse_override_rejects_malformed() {
        assert!(parse_override("level").is_err());
        assert!(parse_override("=3").is_err());
    }
}
