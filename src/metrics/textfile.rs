use prometheus::{Encoder, Registry, TextEncoder};
use std::path::Path;

pub fn render(registry: &Registry) -> anyhow::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;

    Ok(String::from_utf8(buffer)?)
}

/// Write the registry next to `path` and rename it into place, so a
/// collector never reads a half-written file.
pub async fn write(registry: &Registry, path: &Path) -> anyhow::Result<()> {
    let body = render(registry)?;

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");

    tokio::fs::write(&staging, body).await?;
    tokio::fs::rename(&staging, path).await?;

    tracing::info!(path = %path.display(), "Metrics written");
    Ok(())
}
