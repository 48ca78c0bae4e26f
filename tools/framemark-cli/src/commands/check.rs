//! Check system capabilities.

use framemark_extract::probe::command_exists;

pub fn run() -> anyhow::Result<()> {
    println!("Framemark System Check");
    println!("{}", "=".repeat(50));

    let ffmpeg = command_exists("ffmpeg");
    let ffprobe = command_exists("ffprobe");

    println!(
        "{} ffmpeg:  {}",
        if ffmpeg { "[OK]" } else { "[MISSING]" },
        if ffmpeg { "found in PATH" } else { "not found" }
    );
    println!(
        "{} ffprobe: {}",
        if ffprobe { "[OK]" } else { "[MISSING]" },
        if ffprobe {
            "found in PATH"
        } else {
            "not found (output sizes fall back to nominal tier resolution)"
        }
    );

    println!();
    if ffmpeg {
        println!("All required tools are available. Framemark is ready.");
    } else {
        println!("ffmpeg is required for frame extraction. Install it and re-run.");
    }

    Ok(())
}
