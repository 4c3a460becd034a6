use std::path::{Path, PathBuf};

use {
    anyhow::Context,
    instarelay_config::RelayConfig,
    instarelay_instagram::{InstagramClient, MediaFetcher, Shortcode, is_instagram_link},
    instarelay_media::{ClassifiedFile, classify_dir},
    tracing::info,
};

/// `instarelay fetch`: download one post into `output` and list the media.
pub async fn fetch(config: &RelayConfig, link: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    if !is_instagram_link(link) {
        anyhow::bail!("not an Instagram link: {link}");
    }
    let shortcode = Shortcode::from_link(link)?;
    let target = output.unwrap_or_else(|| PathBuf::from(shortcode.as_str()));
    tokio::fs::create_dir_all(&target)
        .await
        .with_context(|| format!("failed to create {}", target.display()))?;

    let client = InstagramClient::new(config.instagram.clone())?;
    let summary = client.fetch(&shortcode, &target).await?;
    info!(
        shortcode = %shortcode,
        files_written = summary.files_written,
        "post downloaded"
    );

    let files = classify_dir(&target).await?;
    print!("{}", render_listing(&target, &files));
    Ok(())
}

fn render_listing(target: &Path, files: &[ClassifiedFile]) -> String {
    if files.is_empty() {
        return format!("no video or photo found in {}\n", target.display());
    }
    let mut out = String::new();
    for file in files {
        out.push_str(&format!("{:<6} {}\n", file.kind.as_str(), file.path.display()));
    }
    out
}
