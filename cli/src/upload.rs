#![deny(missing_docs)]

//! # Upload Command
//!
//! Publishes a generated definition file to a remote API catalog. Failures
//! are retried a fixed number of times and never touch the local output.

use crate::error::{CliError, CliResult};
use apigraph_core::ExportFormat;
use std::path::PathBuf;
use std::time::Duration;

/// Attempts before an upload is reported as failed.
pub const MAX_ATTEMPTS: u32 = 3;

/// Pause between attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Arguments for the upload command.
#[derive(clap::Args, Debug, Clone)]
pub struct UploadArgs {
    /// Definition file to publish.
    #[clap(long, short, default_value = "docs/swagger.json")]
    pub file: PathBuf,

    /// Catalog API root.
    #[clap(
        long,
        env = "APIGRAPH_CATALOG_URL",
        default_value = "https://api.swaggerhub.com/apis"
    )]
    pub api: String,

    /// Catalog owner.
    #[clap(long, env = "APIGRAPH_CATALOG_OWNER", default_value = "")]
    pub owner: String,

    /// API name; defaults to the file's parent directory name.
    #[clap(long)]
    pub name: Option<String>,

    /// Version to publish.
    #[clap(long, default_value = "1.0")]
    pub version: String,

    /// Publish as private.
    #[clap(long)]
    pub private: bool,

    /// Catalog token sent as `Authorization`.
    #[clap(
        long,
        env = "APIGRAPH_CATALOG_TOKEN",
        default_value = "",
        hide_env_values = true
    )]
    pub token: String,

    /// Payload format; defaults to the file extension.
    #[clap(long)]
    pub format: Option<ExportFormat>,
}

/// `<api>/<owner>/<name>?isPrivate=<private>&version=<version>`.
pub fn upload_url(
    api: &str,
    owner: &str,
    name: &str,
    private: bool,
    version: &str,
) -> CliResult<url::Url> {
    let raw = format!("{}/{}/{}", api.trim_end_matches('/'), owner, name);
    let mut url = url::Url::parse(&raw)
        .map_err(|e| CliError::General(format!("Invalid catalog URL '{}': {}", raw, e)))?;
    url.query_pairs_mut()
        .append_pair("isPrivate", &private.to_string())
        .append_pair("version", version);
    Ok(url)
}

fn resolve_name(args: &UploadArgs) -> CliResult<String> {
    if let Some(name) = &args.name {
        return Ok(name.clone());
    }
    args.file
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::General(format!("Cannot derive an API name from {:?}", args.file)))
}

fn resolve_format(args: &UploadArgs) -> CliResult<ExportFormat> {
    if let Some(format) = args.format {
        return Ok(format);
    }
    let extension = args
        .file
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    extension
        .parse()
        .map_err(|e: apigraph_core::AppError| CliError::General(e.to_string()))
}

fn post_once(
    agent: &ureq::Agent,
    url: &url::Url,
    token: &str,
    format: ExportFormat,
    payload: &[u8],
) -> CliResult<u16> {
    let response = agent
        .post(url.as_str())
        .header("Authorization", token)
        .header("Content-Type", &format!("application/{}", format.media_subtype()))
        .send(payload)
        .map_err(|e| CliError::Http(e.to_string()))?;
    let status = response.status().as_u16();
    if (200..300).contains(&status) {
        Ok(status)
    } else {
        Err(CliError::Http(format!("catalog answered {}", status)))
    }
}

/// Posts with retries; `sleep` runs between attempts.
pub fn post_with_retry<F, S>(mut attempt: F, mut sleep: S) -> CliResult<u16>
where
    F: FnMut() -> CliResult<u16>,
    S: FnMut(Duration),
{
    let mut last = None;
    for n in 1..=MAX_ATTEMPTS {
        match attempt() {
            Ok(status) => return Ok(status),
            Err(e) => {
                tracing::warn!(attempt = n, error = %e, "upload attempt failed");
                last = Some(e);
                if n < MAX_ATTEMPTS {
                    sleep(RETRY_DELAY);
                }
            }
        }
    }
    Err(last.unwrap_or_else(|| CliError::General("upload was never attempted".into())))
}

/// Executes the upload.
pub fn execute(args: &UploadArgs) -> CliResult<()> {
    let payload = std::fs::read(&args.file)?;
    let name = resolve_name(args)?;
    let format = resolve_format(args)?;
    let url = upload_url(&args.api, &args.owner, &name, args.private, &args.version)?;
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(Duration::from_secs(30)))
        .build()
        .into();

    match post_with_retry(
        || post_once(&agent, &url, &args.token, format, &payload),
        std::thread::sleep,
    ) {
        Ok(status) => {
            tracing::info!(%url, status, "uploaded");
            Ok(())
        }
        Err(e) => {
            tracing::error!(%url, error = %e, "upload failed after {} attempts", MAX_ATTEMPTS);
            Err(e)
        }
    }
}
