//! Helpers shared by the endpoint and store tests.

use axum::{
    body::Body,
    extract::{FromRequest, Multipart},
    http::Request,
    response::Response,
};
use serde::de::DeserializeOwned;
use tempfile::TempDir;

use crate::{endpoints, images::ImageStore, response::ApiEnvelope};

/// A file part for [must_make_multipart].
pub(crate) struct MultipartFile<'a> {
    pub field_name: &'a str,
    pub file_name: &'a str,
    pub data: &'a [u8],
}

impl<'a> MultipartFile<'a> {
    pub(crate) fn new(field_name: &'a str, file_name: &'a str, data: &'a [u8]) -> Self {
        Self {
            field_name,
            file_name,
            data,
        }
    }
}

/// Build a `Multipart` extractor from text fields and file parts, the way a
/// browser would encode the category form.
pub(crate) async fn must_make_multipart(
    text_fields: &[(&str, &str)],
    files: &[MultipartFile<'_>],
) -> Multipart {
    let boundary = "MY_BOUNDARY123456789";
    let mut body: Vec<u8> = Vec::new();

    for (name, value) in text_fields {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    for file in files {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                file.field_name, file.file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(file.data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri(endpoints::CREATE_CATEGORY)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    Multipart::from_request(request, &{}).await.unwrap()
}

/// Deserialize a response body as the standard JSON envelope.
pub(crate) async fn parse_envelope<T: DeserializeOwned>(response: Response) -> ApiEnvelope<T> {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    serde_json::from_slice(&body).expect("Could not parse response body as a JSON envelope")
}

/// An image store rooted in a fresh temporary directory.
///
/// The returned `TempDir` must be kept alive for the duration of the test.
pub(crate) fn get_test_image_store() -> (TempDir, ImageStore) {
    let upload_dir = TempDir::new().expect("Could not create temporary upload directory");
    let image_store =
        ImageStore::new(upload_dir.path()).expect("Could not create image store");

    (upload_dir, image_store)
}
