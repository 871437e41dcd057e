//! Asset deployment
//!
//! Uploads the deployment's source directory into the destination bucket,
//! then invalidates the declared paths on the distribution. The invalidation
//! runs after every upload, full scope, no content diffing.

use crate::cloudfront::CloudFront;
use crate::error::{AwsError, Result};
use crate::s3::S3;
use std::path::{Path, PathBuf};
use stratus_core::model::DeploymentSpec;

/// What a deployment did.
#[derive(Debug, Clone)]
pub struct DeploymentOutcome {
    pub uploaded: usize,
    pub invalidation_id: String,
}

/// Upload every file under the deployment source, then invalidate.
pub async fn deploy_assets(
    s3: &S3,
    cloudfront: &CloudFront,
    spec: &DeploymentSpec,
    bucket_name: &str,
    distribution_id: &str,
) -> Result<DeploymentOutcome> {
    let assets = collect_assets(&spec.source)?;
    tracing::info!(
        "Deploying {} files from {} to {}",
        assets.len(),
        spec.source.display(),
        bucket_name
    );

    for (path, key) in &assets {
        s3.upload_file(bucket_name, key, path, content_type(path))
            .await?;
    }

    let invalidation_id = cloudfront
        .create_invalidation(distribution_id, &spec.distribution_paths)
        .await?;

    Ok(DeploymentOutcome {
        uploaded: assets.len(),
        invalidation_id,
    })
}

/// Walk the source directory into (file path, object key) pairs, sorted by
/// key so uploads happen in a stable order.
pub fn collect_assets(source: &Path) -> Result<Vec<(PathBuf, String)>> {
    if !source.is_dir() {
        return Err(AwsError::SourceNotFound(source.to_path_buf()));
    }

    let pattern = format!("{}/**/*", source.display());
    let mut assets = Vec::new();
    for entry in glob::glob(&pattern)
        .map_err(|e| AwsError::InvalidSource(format!("{}: {e}", source.display())))?
    {
        let path = entry.map_err(|e| AwsError::Io(e.into_error()))?;
        if !path.is_file() {
            continue;
        }
        let key = path
            .strip_prefix(source)
            .map_err(|e| AwsError::InvalidSource(format!("{}: {e}", path.display())))?
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        assets.push((path, key));
    }

    assets.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(assets)
}

/// Content type by file extension; unknown extensions upload as raw bytes.
pub fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") | Some("mjs") => "application/javascript",
        Some("json") | Some("map") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain",
        Some("xml") => "application/xml",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn collect_assets_walks_nested_directories() {
        let dist = tempfile::tempdir().unwrap();
        fs::write(dist.path().join("index.html"), "<html></html>").unwrap();
        fs::create_dir_all(dist.path().join("static/js")).unwrap();
        fs::write(dist.path().join("static/js/app.js"), "console.log(1)").unwrap();
        fs::write(dist.path().join("static/style.css"), "body {}").unwrap();

        let assets = collect_assets(dist.path()).unwrap();
        let keys: Vec<&str> = assets.iter().map(|(_, key)| key.as_str()).collect();

        assert_eq!(keys, ["index.html", "static/js/app.js", "static/style.css"]);
    }

    #[test]
    fn missing_source_directory_is_an_error() {
        let missing = Path::new("definitely/not/here");
        assert!(matches!(
            collect_assets(missing),
            Err(AwsError::SourceNotFound(_))
        ));
    }

    #[test]
    fn content_types_cover_the_usual_site_assets() {
        assert_eq!(content_type(Path::new("index.html")), "text/html");
        assert_eq!(content_type(Path::new("a/b/app.js")), "application/javascript");
        assert_eq!(content_type(Path::new("style.css")), "text/css");
        assert_eq!(content_type(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(content_type(Path::new("favicon.ico")), "image/x-icon");
        assert_eq!(content_type(Path::new("no-extension")), "application/octet-stream");
    }
}
