//! Streams an exported file to the client while the response owns it.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use article_service_cli::TransientFile;
use axum::body::{Body, Bytes};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use futures::Stream;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::error::ApiError;

/// File body that marks the export delivered at EOF. The guard goes away with
/// the body, so the file is removed whether or not the client read it all.
pub struct DeliveryStream {
    inner: ReaderStream<File>,
    export: TransientFile,
}

impl DeliveryStream {
    pub fn new(file: File, export: TransientFile) -> Self {
        Self {
            inner: ReaderStream::new(file),
            export,
        }
    }
}

impl Stream for DeliveryStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = Pin::new(&mut self.inner).poll_next(cx);
        if let Poll::Ready(None) = polled {
            self.export.mark_delivered();
        }
        polled
    }
}

pub async fn attachment(export: TransientFile) -> Result<Response, ApiError> {
    let file = File::open(&export.file().filepath).await?;
    let length = file.metadata().await?.len();

    let headers = [
        (CONTENT_TYPE, export.format().mime_type().to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.file().filename),
        ),
        (CONTENT_LENGTH, length.to_string()),
    ];
    let body = Body::from_stream(DeliveryStream::new(file, export));
    Ok((headers, body).into_response())
}
