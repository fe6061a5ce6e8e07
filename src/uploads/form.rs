use actix_multipart::{Field, Multipart};
use futures::StreamExt;
use std::collections::HashMap;

use super::UploadedImage;
use crate::error::AppError;

/// Name of the multipart part carrying the product image.
pub const IMAGE_FIELD: &str = "image";

const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// Text fields and the optional image of a product form.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub fields: HashMap<String, String>,
    pub image: Option<UploadedImage>,
}

/// Drains a multipart payload into a `ProductForm`.
///
/// An `image` part without a filename and without content is what browsers send
/// for an untouched file input, so it is treated as no image at all.
pub async fn read_product_form(
    mut payload: Multipart,
    max_image_bytes: usize,
) -> Result<ProductForm, AppError> {
    let mut form = ProductForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_string();
        let filename = disposition
            .get_filename()
            .filter(|f| !f.is_empty())
            .map(String::from);

        if name == IMAGE_FIELD {
            let content_type = field.content_type().map(|mime| mime.to_string());
            let bytes = read_field(&mut field, max_image_bytes, "image").await?;
            if filename.is_none() && bytes.is_empty() {
                continue;
            }
            form.image = Some(UploadedImage {
                filename,
                content_type,
                bytes,
            });
        } else if filename.is_some() {
            // Stray file parts are drained and ignored.
            read_field(&mut field, max_image_bytes, &name).await?;
        } else {
            let bytes = read_field(&mut field, MAX_TEXT_FIELD_BYTES, &name).await?;
            let value = String::from_utf8(bytes).map_err(|_| {
                AppError::ValidationError(format!("{} must be valid UTF-8 text", name))
            })?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

async fn read_field(field: &mut Field, limit: usize, name: &str) -> Result<Vec<u8>, AppError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        if bytes.len() + chunk.len() > limit {
            return Err(AppError::ValidationError(format!(
                "{} exceeds the {} byte limit",
                name, limit
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
