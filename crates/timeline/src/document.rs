//! FCPXML document parsing.
//!
//! A single pass over the document collects format nodes, asset nodes, and
//! asset-clips with their marker children. Resolution then builds the asset
//! index (path + frame rate per asset id) and emits one [`Marker`] per
//! resolvable marker, in document traversal order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

use crate::timecode::parse_timecode;

/// Placeholder label for markers without a usable name.
pub const UNNAMED_MARKER: &str = "unnamed_marker";

/// Working frame rate used when no asset declares one.
pub const DEFAULT_FRAME_RATE: f64 = 30.0;

/// A source-media reference from the document's resource section.
#[derive(Debug, Clone, Serialize)]
pub struct Asset {
    /// Asset id, unique within the document.
    pub id: String,
    /// Absolute path to the media file, decoded from the `src` URI.
    pub path: PathBuf,
    /// Frames per second recovered from the asset's format node.
    pub frame_rate: f64,
}

/// A named point-in-time annotation resolved to its source media.
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    /// Marker label, or [`UNNAMED_MARKER`] when absent.
    pub name: String,
    /// Absolute time within the referenced media, in seconds.
    pub timestamp_secs: f64,
    /// Frame number consistent with the owning asset's frame rate.
    pub frame_index: i64,
    /// Path of the resolved asset (owned copy).
    pub source_path: PathBuf,
}

/// Errors fatal to the whole parse. Per-asset, per-clip, and per-marker
/// problems are swallowed with a diagnostic instead.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed document: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// A parsed FCPXML document: the asset index, the working frame rate, and
/// the ordered marker sequence.
#[derive(Debug, Clone)]
pub struct FcpxmlDocument {
    /// Assets in document discovery order.
    pub assets: Vec<Asset>,
    /// Frame rate used for decimal-timecode conversion.
    pub working_fps: f64,
    /// Markers in document traversal order (not sorted by timestamp).
    pub markers: Vec<Marker>,
}

#[derive(Debug, Default)]
struct RawAsset {
    id: String,
    format_ref: Option<String>,
    src: Option<String>,
}

#[derive(Debug, Default)]
struct RawClip {
    asset_ref: Option<String>,
    offset: Option<String>,
    markers: Vec<RawMarker>,
}

#[derive(Debug, Default)]
struct RawMarker {
    value: Option<String>,
    start: Option<String>,
}

impl FcpxmlDocument {
    /// Parse an FCPXML file from disk.
    pub fn parse(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path).map_err(|e| DocumentError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse_str(&xml)
    }

    /// Parse an FCPXML document from a string.
    pub fn parse_str(xml: &str) -> Result<Self, DocumentError> {
        let mut reader = quick_xml::Reader::from_str(xml);

        let mut formats: HashMap<String, String> = HashMap::new();
        let mut raw_assets: Vec<RawAsset> = Vec::new();
        let mut raw_clips: Vec<RawClip> = Vec::new();

        let mut current_asset: Option<RawAsset> = None;
        let mut current_clip: Option<RawClip> = None;

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => {
                    collect_element(
                        e,
                        true,
                        &mut formats,
                        &mut current_asset,
                        &mut current_clip,
                    );
                }
                Event::Empty(ref e) => {
                    collect_element(
                        e,
                        false,
                        &mut formats,
                        &mut current_asset,
                        &mut current_clip,
                    );
                }
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"asset" => {
                        if let Some(asset) = current_asset.take() {
                            raw_assets.push(asset);
                        }
                    }
                    b"asset-clip" => {
                        if let Some(clip) = current_clip.take() {
                            raw_clips.push(clip);
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        let assets = resolve_assets(raw_assets, &formats);
        let working_fps = assets
            .first()
            .map(|a| a.frame_rate)
            .unwrap_or(DEFAULT_FRAME_RATE);

        let markers = resolve_markers(raw_clips, &assets, working_fps);

        if markers.is_empty() {
            tracing::debug!("Document parsed without any resolvable markers");
        }

        Ok(Self {
            assets,
            working_fps,
            markers,
        })
    }
}

fn collect_element(
    e: &BytesStart<'_>,
    is_container: bool,
    formats: &mut HashMap<String, String>,
    current_asset: &mut Option<RawAsset>,
    current_clip: &mut Option<RawClip>,
) {
    match e.local_name().as_ref() {
        b"format" => {
            if let (Some(id), Some(duration)) =
                (attr_value(e, b"id"), attr_value(e, b"frameDuration"))
            {
                formats.insert(id, duration);
            }
        }
        b"asset" => {
            // Self-closing assets carry no media-rep and are never indexed.
            if is_container {
                if let Some(id) = attr_value(e, b"id") {
                    *current_asset = Some(RawAsset {
                        id,
                        format_ref: attr_value(e, b"format"),
                        src: None,
                    });
                }
            }
        }
        b"media-rep" => {
            if let Some(asset) = current_asset.as_mut() {
                if attr_value(e, b"kind").as_deref() == Some("original-media") {
                    asset.src = attr_value(e, b"src");
                }
            }
        }
        b"asset-clip" => {
            if is_container {
                *current_clip = Some(RawClip {
                    asset_ref: attr_value(e, b"ref"),
                    offset: attr_value(e, b"offset"),
                    markers: Vec::new(),
                });
            }
        }
        b"marker" => {
            if let Some(clip) = current_clip.as_mut() {
                clip.markers.push(RawMarker {
                    value: attr_value(e, b"value"),
                    start: attr_value(e, b"start"),
                });
            }
        }
        _ => {}
    }
}

fn attr_value(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Build the asset index from collected resource nodes. Assets without an
/// original-media representation or a resolvable frame rate are excluded.
fn resolve_assets(raw_assets: Vec<RawAsset>, formats: &HashMap<String, String>) -> Vec<Asset> {
    let mut assets = Vec::new();

    for raw in raw_assets {
        let Some(src) = raw.src else {
            continue;
        };

        let Some(format_ref) = raw.format_ref else {
            tracing::debug!(asset = %raw.id, "Excluding asset without a format reference");
            continue;
        };

        let Some(duration) = formats.get(&format_ref) else {
            tracing::debug!(asset = %raw.id, format = %format_ref, "Excluding asset with unknown format");
            continue;
        };

        let Some(frame_rate) = frame_rate_from_duration(duration) else {
            tracing::debug!(asset = %raw.id, duration = %duration, "Excluding asset with malformed frameDuration");
            continue;
        };

        assets.push(Asset {
            id: raw.id,
            path: decode_source_uri(&src),
            frame_rate,
        });
    }

    assets
}

fn resolve_markers(raw_clips: Vec<RawClip>, assets: &[Asset], working_fps: f64) -> Vec<Marker> {
    let index: HashMap<&str, &Asset> = assets.iter().map(|a| (a.id.as_str(), a)).collect();

    let mut markers = Vec::new();
    for clip in raw_clips {
        let Some(asset) = clip
            .asset_ref
            .as_deref()
            .and_then(|r| index.get(r).copied())
        else {
            tracing::debug!(
                asset_ref = clip.asset_ref.as_deref().unwrap_or("<none>"),
                "Skipping clip with unresolved asset reference"
            );
            continue;
        };

        // The clip offset is sequence-relative. It is parsed for diagnostics
        // but marker timestamps stay clip-local, un-adjusted.
        if let Some(offset) = clip.offset.as_deref() {
            if let Ok(tc) = parse_timecode(offset, working_fps) {
                tracing::debug!(asset = %asset.id, offset_secs = tc.seconds, "Clip offset (not applied)");
            }
        }

        for raw in clip.markers {
            let name = match raw.value {
                Some(v) if !v.trim().is_empty() => v,
                _ => UNNAMED_MARKER.to_string(),
            };

            let start = raw.start.unwrap_or_default();
            let tc = match parse_timecode(&start, working_fps) {
                Ok(tc) => tc,
                Err(e) => {
                    tracing::warn!(marker = %name, start = %start, "Skipping marker: {e}");
                    continue;
                }
            };

            markers.push(Marker {
                name,
                timestamp_secs: tc.seconds,
                frame_index: tc.frame,
                source_path: asset.path.clone(),
            });
        }
    }

    markers
}

/// Recover frames-per-second from a format node's `frameDuration` text.
/// The value is a rational time-per-frame (`"1001/24000s"`), whose
/// denominator is the working rate.
fn frame_rate_from_duration(duration: &str) -> Option<f64> {
    let duration = duration.trim();
    let duration = duration.strip_suffix('s').unwrap_or(duration);
    let (_, denominator) = duration.split_once('/')?;
    denominator
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
}

/// Decode a media-rep `src` URI into a filesystem path: strip the
/// `file://` scheme prefix and percent-escapes.
fn decode_source_uri(src: &str) -> PathBuf {
    let stripped = src.strip_prefix("file://").unwrap_or(src);
    PathBuf::from(percent_decode(stripped))
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap_document(resources: &str, spine: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<fcpxml version="1.10">
  <resources>
{resources}
  </resources>
  <library>
    <event name="Event">
      <project name="Project">
        <sequence format="r0">
          <spine>
{spine}
          </spine>
        </sequence>
      </project>
    </event>
  </library>
</fcpxml>"#
        )
    }

    #[test]
    fn test_end_to_end_two_markers() {
        let xml = wrap_document(
            r#"<format id="r0" frameDuration="1/30s" width="1920" height="1080"/>
<asset id="a1" format="r0" start="0s" duration="60s">
  <media-rep kind="original-media" src="file:///videos/clip1.mov"/>
</asset>"#,
            r#"<asset-clip ref="a1" offset="0s" duration="10s">
  <marker start="1.0s" duration="1/30s" value="First"/>
  <marker start="2/1s" duration="1/30s" value="Second"/>
</asset-clip>"#,
        );

        let doc = FcpxmlDocument::parse_str(&xml).unwrap();
        assert_eq!(doc.assets.len(), 1);
        assert!((doc.working_fps - 30.0).abs() < 1e-9);
        assert_eq!(doc.markers.len(), 2);

        let first = &doc.markers[0];
        assert_eq!(first.name, "First");
        assert!((first.timestamp_secs - 1.0).abs() < 1e-9);
        assert_eq!(first.frame_index, 30);
        assert_eq!(first.source_path, PathBuf::from("/videos/clip1.mov"));

        // The rational form takes its frame number from the numerator.
        let second = &doc.markers[1];
        assert!((second.timestamp_secs - 2.0).abs() < 1e-9);
        assert_eq!(second.frame_index, 2);
    }

    #[test]
    fn test_unreferenced_clip_yields_no_markers() {
        let xml = wrap_document(
            r#"<format id="r0" frameDuration="1/30s"/>
<asset id="a1" format="r0">
  <media-rep kind="original-media" src="file:///videos/clip1.mov"/>
</asset>"#,
            r#"<asset-clip ref="missing" offset="0s">
  <marker start="1s" value="Orphan"/>
</asset-clip>"#,
        );

        let doc = FcpxmlDocument::parse_str(&xml).unwrap();
        assert!(doc.markers.is_empty());
    }

    #[test]
    fn test_first_asset_frame_rate_wins() {
        let xml = wrap_document(
            r#"<format id="r24" frameDuration="1/24s"/>
<format id="r30" frameDuration="1/30s"/>
<asset id="a1" format="r24">
  <media-rep kind="original-media" src="file:///videos/a.mov"/>
</asset>
<asset id="a2" format="r30">
  <media-rep kind="original-media" src="file:///videos/b.mov"/>
</asset>"#,
            r#"<asset-clip ref="a2" offset="0s">
  <marker start="1.0s" value="On second asset"/>
</asset-clip>"#,
        );

        let doc = FcpxmlDocument::parse_str(&xml).unwrap();
        assert!((doc.working_fps - 24.0).abs() < 1e-9);
        // Decimal markers convert at the working rate even when the clip
        // references a different asset.
        assert_eq!(doc.markers[0].frame_index, 24);
        assert_eq!(doc.markers[0].source_path, PathBuf::from("/videos/b.mov"));
    }

    #[test]
    fn test_markers_keep_document_order() {
        let xml = wrap_document(
            r#"<format id="r0" frameDuration="1/30s"/>
<asset id="a1" format="r0">
  <media-rep kind="original-media" src="file:///videos/a.mov"/>
</asset>
<asset id="a2" format="r0">
  <media-rep kind="original-media" src="file:///videos/b.mov"/>
</asset>"#,
            r#"<asset-clip ref="a1" offset="0s">
  <marker start="9.0s" value="Late"/>
</asset-clip>
<asset-clip ref="a2" offset="10s">
  <marker start="1.0s" value="Early"/>
</asset-clip>"#,
        );

        let doc = FcpxmlDocument::parse_str(&xml).unwrap();
        let names: Vec<&str> = doc.markers.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Late", "Early"]);
    }

    #[test]
    fn test_clip_offset_not_applied() {
        let xml = wrap_document(
            r#"<format id="r0" frameDuration="1/30s"/>
<asset id="a1" format="r0">
  <media-rep kind="original-media" src="file:///videos/a.mov"/>
</asset>"#,
            r#"<asset-clip ref="a1" offset="100s">
  <marker start="1.0s" value="M"/>
</asset-clip>"#,
        );

        let doc = FcpxmlDocument::parse_str(&xml).unwrap();
        assert!((doc.markers[0].timestamp_secs - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_percent_decoded_source_path() {
        let xml = wrap_document(
            r#"<format id="r0" frameDuration="1/30s"/>
<asset id="a1" format="r0">
  <media-rep kind="original-media" src="file:///videos/My%20Clip%20%231.mov"/>
</asset>"#,
            r#"<asset-clip ref="a1" offset="0s">
  <marker start="1.0s" value="M"/>
</asset-clip>"#,
        );

        let doc = FcpxmlDocument::parse_str(&xml).unwrap();
        assert_eq!(
            doc.assets[0].path,
            PathBuf::from("/videos/My Clip #1.mov")
        );
    }

    #[test]
    fn test_malformed_marker_is_skipped() {
        let xml = wrap_document(
            r#"<format id="r0" frameDuration="1/30s"/>
<asset id="a1" format="r0">
  <media-rep kind="original-media" src="file:///videos/a.mov"/>
</asset>"#,
            r#"<asset-clip ref="a1" offset="0s">
  <marker start="garbage" value="Bad"/>
  <marker start="3.0s" value="Good"/>
</asset-clip>"#,
        );

        let doc = FcpxmlDocument::parse_str(&xml).unwrap();
        assert_eq!(doc.markers.len(), 1);
        assert_eq!(doc.markers[0].name, "Good");
    }

    #[test]
    fn test_missing_name_and_start_defaults() {
        let xml = wrap_document(
            r#"<format id="r0" frameDuration="1/30s"/>
<asset id="a1" format="r0">
  <media-rep kind="original-media" src="file:///videos/a.mov"/>
</asset>"#,
            r#"<asset-clip ref="a1" offset="0s">
  <marker value=""/>
</asset-clip>"#,
        );

        let doc = FcpxmlDocument::parse_str(&xml).unwrap();
        assert_eq!(doc.markers.len(), 1);
        assert_eq!(doc.markers[0].name, UNNAMED_MARKER);
        assert_eq!(doc.markers[0].timestamp_secs, 0.0);
        assert_eq!(doc.markers[0].frame_index, 0);
    }

    #[test]
    fn test_asset_without_format_is_excluded() {
        let xml = wrap_document(
            r#"<asset id="a1">
  <media-rep kind="original-media" src="file:///videos/a.mov"/>
</asset>"#,
            r#"<asset-clip ref="a1" offset="0s">
  <marker start="1.0s" value="M"/>
</asset-clip>"#,
        );

        let doc = FcpxmlDocument::parse_str(&xml).unwrap();
        assert!(doc.assets.is_empty());
        assert!(doc.markers.is_empty());
        assert!((doc.working_fps - DEFAULT_FRAME_RATE).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_frame_duration_excludes_asset() {
        let xml = wrap_document(
            r#"<format id="r0" frameDuration="thirty"/>
<asset id="a1" format="r0">
  <media-rep kind="original-media" src="file:///videos/a.mov"/>
</asset>"#,
            "",
        );

        let doc = FcpxmlDocument::parse_str(&xml).unwrap();
        assert!(doc.assets.is_empty());
    }

    #[test]
    fn test_proxy_only_asset_is_excluded() {
        let xml = wrap_document(
            r#"<format id="r0" frameDuration="1/30s"/>
<asset id="a1" format="r0">
  <media-rep kind="proxy-media" src="file:///proxies/a.mov"/>
</asset>"#,
            "",
        );

        let doc = FcpxmlDocument::parse_str(&xml).unwrap();
        assert!(doc.assets.is_empty());
    }

    #[test]
    fn test_high_rate_format_denominator() {
        let xml = wrap_document(
            r#"<format id="r0" frameDuration="1001/24000s"/>
<asset id="a1" format="r0">
  <media-rep kind="original-media" src="file:///videos/a.mov"/>
</asset>"#,
            "",
        );

        let doc = FcpxmlDocument::parse_str(&xml).unwrap();
        assert!((doc.assets[0].frame_rate - 24000.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_document_is_ok() {
        let doc = FcpxmlDocument::parse_str(&wrap_document("", "")).unwrap();
        assert!(doc.assets.is_empty());
        assert!(doc.markers.is_empty());
    }

    #[test]
    fn test_unparseable_markup_is_fatal() {
        assert!(FcpxmlDocument::parse_str("<fcpxml><resources></fcpxml>").is_err());
    }

    #[test]
    fn test_parse_missing_file_is_io_error() {
        let err = FcpxmlDocument::parse("/nonexistent/project.fcpxml").unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
    }
}
