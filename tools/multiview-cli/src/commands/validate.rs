//! Validate a viewer configuration.

use std::path::PathBuf;

use multiview_model::load_config;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating configuration at: {}", path.display());

    let config = load_config(&path).map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let referenced = config.referenced_cameras();
    let undefined: Vec<&str> = referenced
        .iter()
        .map(String::as_str)
        .filter(|name| !config.cameras.contains_key(name))
        .collect();
    let unused: Vec<&str> = config
        .cameras
        .keys()
        .filter(|name| !referenced.iter().any(|r| r == name))
        .collect();

    println!("  Cameras defined: {}", config.cameras.len());
    println!("  Cameras used by layouts: {}", referenced.len());
    println!("  Layouts: {}", config.layouts.len());
    println!(
        "  Active layout: {}",
        config
            .layouts
            .keys()
            .nth(config.active_layout_index())
            .unwrap_or("-")
    );
    println!("  Text overlays: {}", config.text_overlays.len());
    println!("  Initial sensor fields: {}", config.initial_dynamic_data.len());

    if undefined.is_empty() && unused.is_empty() {
        println!("\nConfiguration is valid.");
    } else {
        println!("\nNotes:");
        for name in &undefined {
            println!("  - camera '{name}' is used by a layout but not defined (480x640 assumed)");
        }
        for name in &unused {
            println!("  - camera '{name}' is defined but not used by any layout");
        }
        println!("\nConfiguration is valid.");
    }

    Ok(())
}
