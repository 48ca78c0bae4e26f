//! List markers found in a project file.

use std::path::PathBuf;

use framemark_timeline::FcpxmlDocument;

pub fn run(path: PathBuf, json: bool) -> anyhow::Result<()> {
    let doc = FcpxmlDocument::parse(&path)
        .map_err(|e| anyhow::anyhow!("Failed to parse project: {e}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&doc.markers)?);
        return Ok(());
    }

    println!("Project: {}", path.display());
    println!("  Working frame rate: {}", doc.working_fps);
    println!("  Assets: {}", doc.assets.len());
    for asset in &doc.assets {
        println!(
            "    {} ({} fps): {}",
            asset.id,
            asset.frame_rate,
            asset.path.display()
        );
    }
    println!();

    if doc.markers.is_empty() {
        println!("No markers found.");
        return Ok(());
    }

    println!("Markers: {}", doc.markers.len());
    for m in &doc.markers {
        println!(
            "  {:>10.3}s  frame {:>8}  {}  ({})",
            m.timestamp_secs,
            m.frame_index,
            m.name,
            m.source_path.display()
        );
    }

    Ok(())
}
