//! Show computed layouts.

use std::path::PathBuf;

use multiview_processing::LayoutNode;

use super::open_composer;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let composer = open_composer(&path)?;
    let layouts = composer.layouts();

    for (index, (name, root)) in layouts.iter().enumerate() {
        let marker = if index == layouts.active_index() {
            " (overlays)"
        } else {
            ""
        };
        println!("Layout [{index}] {name}: {}{marker}", root.size());
        print_tree(root, 1);

        if let Some(targets) = layouts.target_sizes(index) {
            println!("  Target sizes:");
            for (camera, size) in targets {
                println!("    {camera}: {size}");
            }
        }
        println!();
    }

    Ok(())
}

fn print_tree(node: &LayoutNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        LayoutNode::Leaf { camera, size } => println!("{indent}- {camera} {size}"),
        LayoutNode::Junction {
            direction,
            left,
            right,
            size,
        } => {
            println!("{indent}+ {direction:?} {size}");
            print_tree(left, depth + 1);
            print_tree(right, depth + 1);
        }
    }
}
