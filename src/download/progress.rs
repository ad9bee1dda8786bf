//! yt-dlp console output parsing.
//!
//! yt-dlp is run with `--newline`, so every progress tick arrives as its own
//! line, e.g.:
//!
//! ```text
//! [download]  42.3% of ~  10.00MiB at    1.00MiB/s ETA 00:05
//! [download] 100% of   10.00MiB in 00:00:02 at 4.50MiB/s
//! [download] downloads/x.mp4 has already been downloaded
//! ```

use crate::download::source::ProgressEvent;

/// Parse one line of yt-dlp output into a progress event.
///
/// The percentage is relayed exactly as yt-dlp printed it; it is display
/// text, not a number. Returns `None` for every non-progress line.
pub fn parse_progress(line: &str) -> Option<ProgressEvent> {
    let rest = line.trim().strip_prefix("[download]")?;

    if rest.trim_end().ends_with("has already been downloaded") {
        return Some(ProgressEvent::Finished);
    }

    let parts: Vec<&str> = rest.split_whitespace().collect();
    let percent = parts.first().filter(|p| is_percent_token(p))?;

    // The closing summary line reports elapsed time ("in 00:00:02") instead of an ETA
    if parts.contains(&"in") && !parts.contains(&"ETA") {
        log::trace!("Download finished line: {}", line);
        return Some(ProgressEvent::Finished);
    }

    Some(ProgressEvent::Downloading {
        percent: percent.to_string(),
    })
}

fn is_percent_token(token: &str) -> bool {
    token
        .strip_suffix('%')
        .is_some_and(|num| !num.is_empty() && num.parse::<f32>().is_ok())
}

/// Pick the message to surface from yt-dlp stderr.
///
/// yt-dlp prefixes fatal problems with `ERROR:`; the last such line is the
/// one that made the process fail. Without one, the trimmed tail of stderr
/// is used, and if stderr is empty the exit status is reported instead.
pub fn extract_error_message(stderr: &str, status: &str) -> String {
    if let Some(line) = stderr.lines().rev().find(|l| l.trim_start().starts_with("ERROR:")) {
        return line.trim().to_string();
    }

    let tail: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    if tail.is_empty() {
        return format!("yt-dlp exited with {}", status);
    }

    let start = tail.len().saturating_sub(3);
    tail[start..].join("\n").trim().to_string()
}
