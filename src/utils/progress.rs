use indicatif::{ProgressBar, ProgressStyle};

/// 建立進度條；停用時回傳隱藏的進度條，呼叫端不需另外判斷
pub fn progress_bar(len: u64, message: &'static str, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new(len);
    match ProgressStyle::default_bar().template("{msg}: [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len}") {
        Ok(style) => progress.set_style(style.progress_chars("##-")),
        Err(e) => tracing::debug!("Falling back to default progress style: {}", e),
    }
    progress.set_message(message);
    progress
}
