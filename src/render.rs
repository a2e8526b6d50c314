use std::process::Stdio;

use axum::body::Body;
use eyre::{eyre, Result};
use tokio::{io::AsyncWriteExt, process::Command};
use tokio_util::io::ReaderStream;

/// Spawns the renderer and returns its stdout as a streaming response body.
///
/// The HTML is fed to the child's stdin on a background task, and the pipe is
/// closed afterwards to signal end-of-input. The exit status is logged but not
/// surfaced to the client: a renderer failure after streaming has begun shows
/// up as a short or empty body, never as an error status.
pub async fn render(renderer: &str, args: &[String], html: Vec<u8>) -> Result<Body> {
    tracing::info!("Rendering PDF. Arguments: '{}'...", args.join(" "));

    let mut child = Command::new(renderer)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| eyre!("renderer stdin was not captured"))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| eyre!("renderer stdout was not captured"))?;

    tokio::spawn(async move {
        if let Err(err) = stdin.write_all(&html).await {
            tracing::error!("Failed to write HTML to renderer stdin: {err}");
        }
        drop(stdin);
        match child.wait().await {
            Ok(status) => tracing::info!("Renderer finished: {status}"),
            Err(err) => tracing::error!("Failed to wait for renderer: {err}"),
        }
    });

    Ok(Body::from_stream(ReaderStream::new(stdout)))
}
