//! Multipart form parsing shared by the create and update endpoints.

use axum::{
    body::Bytes,
    extract::{Multipart, multipart::Field},
};

use crate::Error;

/// An image file read out of a multipart field.
#[derive(Debug, Clone)]
pub(crate) struct UploadedImage {
    /// The file name the client supplied, used only for its extension.
    pub file_name: String,
    /// The raw file contents.
    pub data: Bytes,
}

/// The category fields a client may submit. Everything is optional at the
/// parsing layer; the endpoints decide what is required.
#[derive(Debug, Default)]
pub(crate) struct CategoryForm {
    pub name: Option<String>,
    pub provider_id: Option<String>,
    pub main_image: Option<UploadedImage>,
    pub icon_image: Option<UploadedImage>,
}

/// Read the known category fields from a multipart form.
///
/// Unknown fields are skipped so that clients sending extra metadata do not
/// fail the whole request.
///
/// # Errors
/// Returns an [Error::MultipartError] if the form itself cannot be parsed or
/// a file field is missing a file name.
pub(crate) async fn read_category_form(mut multipart: Multipart) -> Result<CategoryForm, Error> {
    let mut form = CategoryForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
    {
        let field_name = field.name().map(str::to_owned);

        match field_name.as_deref() {
            Some("categoryName") => form.name = Some(read_text_field(field).await?),
            Some("providerId") => form.provider_id = Some(read_text_field(field).await?),
            Some("mainImage") => form.main_image = Some(read_image_field(field).await?),
            Some("iconImage") => form.icon_image = Some(read_image_field(field).await?),
            name => {
                tracing::debug!("Ignoring unexpected multipart field {name:?}");
            }
        }
    }

    Ok(form)
}

async fn read_text_field(field: Field<'_>) -> Result<String, Error> {
    field.text().await.map_err(|error| {
        tracing::error!("Could not read text from multipart form field: {error}");
        Error::MultipartError("Could not read data from multipart form field.".to_owned())
    })
}

async fn read_image_field(field: Field<'_>) -> Result<UploadedImage, Error> {
    let file_name = match field.file_name() {
        Some(file_name) => file_name.to_owned(),
        None => {
            tracing::error!("Could not get file name from multipart form field: {field:#?}");
            return Err(Error::MultipartError(
                "Could not get file name from multipart form field".to_owned(),
            ));
        }
    };

    let data = match field.bytes().await {
        Ok(data) => data,
        Err(error) => {
            tracing::error!("Could not read data from multipart form field: {error}");
            return Err(Error::MultipartError(
                "Could not read data from multipart form field.".to_owned(),
            ));
        }
    };

    tracing::debug!("Received file '{}' that is {} bytes", file_name, data.len());

    Ok(UploadedImage { file_name, data })
}
