use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;
use futures::StreamExt;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use url::Url;

use crate::error::{Error, Result};
use crate::session::Session;
use crate::utils::display_uri;

/// `<prompt>.ply`, with path separators replaced so the name stays a single
/// path component.
pub fn suggested_file_name(prompt: &str) -> String {
    let stem: String = prompt
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    if stem.is_empty() {
        "model.ply".to_string()
    } else {
        format!("{}.ply", stem)
    }
}

/// Locator and suggested file name of the displayed model. The placeholder
/// shown before the first generation is not downloadable.
pub fn current_download(session: &Session) -> Result<(String, String)> {
    let pending = {
        let state = session.state.lock();
        state
            .has_generated()
            .then(|| (state.object_link.clone(), suggested_file_name(&state.prompt)))
    };
    pending.ok_or_else(|| {
        let e = Error::NothingToDownload;
        log::warn!("{}", e);
        session.report(&e);
        e
    })
}

/// Writes the displayed model to `dest`. Returns the bytes written.
pub async fn download_current(session: &Session, dest: &Path) -> Result<u64> {
    let (uri, _) = current_download(session)?;
    match save_mesh(session.api.http(), &uri, session.page.as_ref(), dest).await {
        Ok(bytes) => {
            log::info!("saved {} bytes to {}", bytes, dest.display());
            Ok(bytes)
        }
        Err(e) => {
            log::error!("download to {} failed: {}", dest.display(), e);
            session.report(&e);
            Err(e)
        }
    }
}

/// Absolute form of `uri`. Relative locators are joined onto `page`.
pub fn resolve_locator(uri: &str, page: Option<&Url>) -> Result<Url> {
    match Url::parse(uri) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => page
            .ok_or_else(|| Error::Download(format!("cannot resolve {}", display_uri(uri))))?
            .join(uri)
            .map_err(|e| Error::Download(format!("cannot resolve {}: {}", display_uri(uri), e))),
        Err(e) => Err(Error::Download(format!("bad locator {}: {}", display_uri(uri), e))),
    }
}

/// Fetches `uri` (http, https, base64 `data:`, or relative to `page`) into
/// `dest`. The bytes are staged next to `dest` and only moved into place once
/// complete, so a failure leaves any existing file untouched.
pub async fn save_mesh(
    client: &reqwest::Client,
    uri: &str,
    page: Option<&Url>,
    dest: &Path,
) -> Result<u64> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut staged = NamedTempFile::new_in(dir)?;

    let written = if uri.starts_with("data:") {
        let bytes = decode_data_uri(uri)?;
        staged.write_all(&bytes)?;
        bytes.len() as u64
    } else {
        let url = resolve_locator(uri, page)?;
        match url.scheme() {
            "http" | "https" => stream_to_file(client, url, staged.as_file_mut()).await?,
            other => {
                return Err(Error::Download(format!(
                    "cannot fetch {} locators: {}",
                    other,
                    display_uri(uri)
                )))
            }
        }
    };

    staged.flush()?;
    staged.persist(dest).map_err(|e| Error::Io(e.error))?;
    Ok(written)
}

async fn stream_to_file(client: &reqwest::Client, url: Url, file: &mut File) -> Result<u64> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| Error::Download(e.to_string()))?;
    if !response.status().is_success() {
        return Err(Error::Download(format!("{} returned {}", url, response.status())));
    }

    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::Download(e.to_string()))?;
        downloaded += chunk.len() as u64;
        file.write_all(&chunk)?;
    }
    Ok(downloaded)
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| Error::Download("malformed data URI".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(Error::Download(format!("unsupported data URI encoding: {}", header)));
    }
    BASE64_ENGINE
        .decode(payload.trim())
        .map_err(|e| Error::Download(format!("bad base64 payload: {}", e)))
}
