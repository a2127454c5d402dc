pub mod bench;
pub mod layout;
pub mod render;
pub mod validate;

use std::path::Path;

use multiview_render::MultiViewComposer;

/// Build a composer, turning load errors into a readable message.
pub fn open_composer(path: &Path) -> anyhow::Result<MultiViewComposer> {
    MultiViewComposer::from_path(path)
        .map_err(|e| anyhow::anyhow!("Failed to load {}: {e}", path.display()))
}
