//! Extract one frame per marker in a project file.

use std::io::Write;
use std::path::PathBuf;

use framemark_common::config::AppConfig;
use framemark_extract::geometry::QualityTier;
use framemark_extract::{extract_markers, ExtractJob, ExtractProgress};
use framemark_timeline::FcpxmlDocument;

pub async fn run(
    path: PathBuf,
    output: Option<PathBuf>,
    quality: Option<String>,
    fast: bool,
) -> anyhow::Result<()> {
    let config = AppConfig::load();

    let doc = FcpxmlDocument::parse(&path)
        .map_err(|e| anyhow::anyhow!("Failed to parse project: {e}"))?;

    if doc.markers.is_empty() {
        println!("No markers found in {}", path.display());
        return Ok(());
    }

    let quality: QualityTier = quality
        .as_deref()
        .unwrap_or(config.extraction.quality.as_str())
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let output_dir = output.unwrap_or_else(|| config.output_dir.clone());
    let high_quality = !fast && config.extraction.high_quality;

    println!("Extracting {} markers from: {}", doc.markers.len(), path.display());
    println!("  Output: {}", output_dir.display());
    println!("  Quality: {quality}{}", if high_quality { "" } else { " (fast)" });

    let job = ExtractJob {
        output_dir,
        quality,
        high_quality,
    };

    let progress_cb: Box<dyn Fn(ExtractProgress) + Send> = Box::new(|p| {
        print!(
            "\r  Progress: {}/{} ({} extracted)  ",
            p.completed, p.total, p.extracted
        );
        std::io::stdout().flush().ok();
    });

    let summary = extract_markers(job, &doc.markers, Some(progress_cb))
        .await
        .map_err(|e| anyhow::anyhow!("Extraction failed: {e}"))?;

    println!();
    if summary.failed == 0 {
        println!(
            "Extracted {} frames to {}",
            summary.extracted,
            summary.output_dir.display()
        );
    } else {
        println!(
            "Extracted {} of {} frames ({} failed). See log for details.",
            summary.extracted, summary.total, summary.failed
        );
    }

    Ok(())
}
