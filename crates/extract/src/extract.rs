//! Per-marker frame extraction via ffmpeg.

use std::path::{Path, PathBuf};
use std::process::Command;

use framemark_common::error::{FramemarkError, FramemarkResult};
use framemark_timeline::Marker;

use crate::geometry::{resolve_output_size, QualityTier};
use crate::probe::{command_exists, probe_dimensions};

/// An extraction job ready to run.
#[derive(Debug, Clone)]
pub struct ExtractJob {
    /// Directory where frames are written (created if missing).
    pub output_dir: PathBuf,

    /// Quality tier anchoring output resolution.
    pub quality: QualityTier,

    /// Use the slow, high-quality encode settings.
    pub high_quality: bool,
}

/// Progress callback invoked after each marker.
pub type ProgressCallback = Box<dyn Fn(ExtractProgress) + Send>;

/// Per-marker progress report.
#[derive(Debug, Clone, Copy)]
pub struct ExtractProgress {
    /// Markers processed so far (success or failure).
    pub completed: usize,

    /// Total markers in the batch.
    pub total: usize,

    /// Frames extracted successfully so far.
    pub extracted: usize,
}

/// Summary of one extraction run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExtractSummary {
    pub total: usize,
    pub extracted: usize,
    pub failed: usize,
    pub output_dir: PathBuf,
    pub started_at: String,
}

/// Extract one still frame per marker.
///
/// This is the main entry point for extraction. Markers are processed
/// sequentially, one ffmpeg process each; a marker that fails to render is
/// logged and skipped without aborting the batch.
pub async fn extract_markers(
    job: ExtractJob,
    markers: &[Marker],
    progress: Option<ProgressCallback>,
) -> FramemarkResult<ExtractSummary> {
    if !command_exists("ffmpeg") {
        return Err(FramemarkError::unsupported(
            "ffmpeg not found in PATH; install it to enable frame extraction",
        ));
    }

    std::fs::create_dir_all(&job.output_dir)?;
    let started_at = chrono::Utc::now().to_rfc3339();

    tracing::info!(
        total = markers.len(),
        output = %job.output_dir.display(),
        quality = %job.quality,
        high_quality = job.high_quality,
        "Starting extraction"
    );

    let mut extracted = 0usize;
    for (i, marker) in markers.iter().enumerate() {
        match extract_frame(&job, marker) {
            Ok(path) => {
                extracted += 1;
                tracing::debug!(marker = %marker.name, output = %path.display(), "Frame extracted");
            }
            Err(e) => {
                tracing::warn!(marker = %marker.name, error = %e, "Frame extraction failed");
            }
        }

        if let Some(cb) = &progress {
            cb(ExtractProgress {
                completed: i + 1,
                total: markers.len(),
                extracted,
            });
        }
    }

    let summary = ExtractSummary {
        total: markers.len(),
        extracted,
        failed: markers.len() - extracted,
        output_dir: job.output_dir.clone(),
        started_at,
    };

    tracing::info!(
        extracted = summary.extracted,
        failed = summary.failed,
        "Extraction finished"
    );

    Ok(summary)
}

/// Extract a single marker's frame. The output resolution is resolved from
/// the probed source dimensions and the job's quality tier.
fn extract_frame(job: &ExtractJob, marker: &Marker) -> FramemarkResult<PathBuf> {
    let output_path = job
        .output_dir
        .join(format!("{}.jpg", output_stem(marker)));

    let dimensions = probe_dimensions(&marker.source_path);
    let (width, height) = resolve_output_size(dimensions, job.quality);

    let args = ffmpeg_args(
        &marker.source_path,
        marker.timestamp_secs,
        width,
        height,
        job.high_quality,
        &output_path,
    );

    tracing::debug!(args = ?args, "Running ffmpeg");
    let output = Command::new("ffmpeg")
        .args(&args)
        .output()
        .map_err(|e| FramemarkError::extract(format!("Failed to start ffmpeg: {e}")))?;

    if !output.status.success() {
        return Err(FramemarkError::extract(format!(
            "ffmpeg exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(output_path)
}

fn ffmpeg_args(
    source: &Path,
    timestamp_secs: f64,
    width: u32,
    height: u32,
    high_quality: bool,
    output_path: &Path,
) -> Vec<String> {
    let mut args = vec![
        "-ss".to_string(),
        format!("{timestamp_secs}"),
        "-i".to_string(),
        source.display().to_string(),
        "-vframes".to_string(),
        "1".to_string(),
    ];

    if high_quality {
        args.extend([
            "-q:v".to_string(),
            "1".to_string(),
            "-compression_level".to_string(),
            "0".to_string(),
            "-vf".to_string(),
            format!("scale={width}:{height}:flags=lanczos,unsharp=3:3:1.5:3:3:0.5"),
            "-preset".to_string(),
            "veryslow".to_string(),
            "-qmin".to_string(),
            "1".to_string(),
            "-qmax".to_string(),
            "1".to_string(),
        ]);
    } else {
        args.extend([
            "-q:v".to_string(),
            "3".to_string(),
            "-vf".to_string(),
            format!("scale={width}:{height}"),
        ]);
    }

    args.push("-y".to_string());
    args.push(output_path.display().to_string());
    args
}

/// Output filename stem for a marker: the label with everything but
/// alphanumerics, spaces, hyphens, and underscores removed, or a
/// frame-index fallback when nothing survives.
pub fn output_stem(marker: &Marker) -> String {
    let safe: String = marker
        .name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();

    let safe = safe.trim();
    if safe.is_empty() {
        format!("marker_{}", marker.frame_index)
    } else {
        safe.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(name: &str, frame_index: i64) -> Marker {
        Marker {
            name: name.to_string(),
            timestamp_secs: 0.0,
            frame_index,
            source_path: PathBuf::from("/videos/a.mov"),
        }
    }

    #[test]
    fn test_output_stem_keeps_safe_characters() {
        assert_eq!(output_stem(&marker("Scene 1 - take_2", 0)), "Scene 1 - take_2");
    }

    #[test]
    fn test_output_stem_strips_punctuation() {
        assert_eq!(output_stem(&marker("cut! @03:14?", 0)), "cut 0314");
    }

    #[test]
    fn test_output_stem_falls_back_to_frame_index() {
        assert_eq!(output_stem(&marker("!!!", 75)), "marker_75");
        assert_eq!(output_stem(&marker("   ", 75)), "marker_75");
    }

    #[test]
    fn test_high_quality_args_use_lanczos_and_unsharp() {
        let args = ffmpeg_args(
            Path::new("/videos/a.mov"),
            1.5,
            1920,
            1080,
            true,
            Path::new("/out/f.jpg"),
        );
        let vf = args
            .iter()
            .position(|a| a == "-vf")
            .map(|i| args[i + 1].as_str())
            .unwrap();
        assert!(vf.contains("scale=1920:1080:flags=lanczos"));
        assert!(vf.contains("unsharp"));
        assert!(args.contains(&"-qmin".to_string()));
    }

    #[test]
    fn test_standard_args_use_plain_scale() {
        let args = ffmpeg_args(
            Path::new("/videos/a.mov"),
            1.5,
            1280,
            720,
            false,
            Path::new("/out/f.jpg"),
        );
        assert!(args.contains(&"scale=1280:720".to_string()));
        assert!(!args.iter().any(|a| a.contains("unsharp")));
        assert_eq!(args[1], "1.5");
        assert_eq!(args.last().map(String::as_str), Some("/out/f.jpg"));
    }
}
