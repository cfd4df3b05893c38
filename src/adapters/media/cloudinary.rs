use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use super::{MediaError, MediaHost, ResourceType, UploadOptions, UploadedMedia};
use crate::config::CloudinaryCredentials;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Deserialize)]
struct UploadResponse {
	secure_url: String,
	#[serde(default)]
	duration: Option<f64>,
}

#[derive(Deserialize)]
struct ErrorResponse {
	error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
	message: String,
}

/// Signed uploads against the Cloudinary REST API.
pub struct CloudinaryHost {
	client: reqwest::Client,
	credentials: Option<CloudinaryCredentials>,
}

impl CloudinaryHost {
	pub fn new(credentials: Option<CloudinaryCredentials>) -> Self {
		if credentials.is_none() {
			tracing::warn!("Cloudinary credentials missing; media uploads will fail");
		}
		Self {
			client: reqwest::Client::new(),
			credentials,
		}
	}
}

/// Parameters that take part in the signature, already in alphabetical order.
fn signed_params(
	folder: &str,
	timestamp: i64,
) -> Vec<(&'static str, String)> {
	vec![
		("folder", folder.to_string()),
		("overwrite", "false".to_string()),
		("timestamp", timestamp.to_string()),
		("unique_filename", "true".to_string()),
		("use_filename", "true".to_string()),
	]
}

fn sign(
	params: &[(&'static str, String)],
	api_secret: &str,
) -> String {
	let to_sign = params.iter().map(|(key, value)| format!("{key}={value}")).collect::<Vec<_>>().join("&");
	let mut hasher = Sha1::new();
	hasher.update(to_sign.as_bytes());
	hasher.update(api_secret.as_bytes());
	hex::encode(hasher.finalize())
}

/// Cloudinary serves a poster frame for a video at the same path with `.jpg`.
pub fn video_thumbnail(url: &str) -> String {
	let file_start = url.rfind('/').map(|i| i + 1).unwrap_or(0);
	match url[file_start..].rfind('.') {
		Some(dot) => format!("{}.jpg", &url[..file_start + dot]),
		None => format!("{url}.jpg"),
	}
}

#[async_trait]
impl MediaHost for CloudinaryHost {
	async fn upload(
		&self,
		data: Bytes,
		options: UploadOptions,
	) -> Result<UploadedMedia, MediaError> {
		if data.is_empty() {
			return Err(MediaError::EmptyInput);
		}
		let credentials = self.credentials.as_ref().ok_or(MediaError::NotConfigured)?;

		let params = signed_params(&options.folder, Utc::now().timestamp());
		let signature = sign(&params, &credentials.api_secret);

		let mut form = Form::new()
			.part("file", Part::bytes(data.to_vec()).file_name("upload"))
			.text("api_key", credentials.api_key.clone())
			.text("signature", signature);
		for (key, value) in params {
			form = form.text(key, value);
		}

		let url = format!("{API_BASE}/{}/{}/upload", credentials.cloud_name, options.resource_type.as_str());
		let response = self.client.post(url).multipart(form).send().await?;

		if !response.status().is_success() {
			let status = response.status();
			let message = match response.json::<ErrorResponse>().await {
				Ok(body) => body.error.message,
				Err(_) => format!("status {status}"),
			};
			tracing::error!(folder = %options.folder, %message, "Cloudinary upload error");
			return Err(MediaError::Rejected(message));
		}

		let uploaded: UploadResponse = response.json().await?;
		tracing::info!(url = %uploaded.secure_url, "File uploaded to Cloudinary");

		let thumbnail_url = match options.resource_type {
			ResourceType::Video => Some(video_thumbnail(&uploaded.secure_url)),
			_ => None,
		};
		Ok(UploadedMedia {
			url: uploaded.secure_url,
			thumbnail_url,
			duration: uploaded.duration,
		})
	}
}

#[cfg(test)]
mod test {
	use bytes::Bytes;

	use super::{sign, signed_params, video_thumbnail, CloudinaryHost};
	use crate::adapters::media::{MediaError, MediaHost, ResourceType, UploadOptions};

	#[test]
	fn test_signature_covers_sorted_params_and_secret() {
		let params = signed_params("posts/u1", 1_700_000_000);
		let signature = sign(&params, "shh");

		assert_eq!(signature.len(), 40);
		assert_eq!(signature, sign(&signed_params("posts/u1", 1_700_000_000), "shh"));
		assert_ne!(signature, sign(&params, "other"));
		assert_ne!(signature, sign(&signed_params("posts/u2", 1_700_000_000), "shh"));
	}

	#[test]
	fn test_video_thumbnail_replaces_extension() {
		assert_eq!(
			video_thumbnail("https://res.cloudinary.com/demo/video/upload/v1/posts/u1/clip.mp4"),
			"https://res.cloudinary.com/demo/video/upload/v1/posts/u1/clip.jpg"
		);
		assert_eq!(video_thumbnail("https://cdn.example.com/v1.2/clip"), "https://cdn.example.com/v1.2/clip.jpg");
	}

	#[tokio::test]
	async fn test_upload_without_credentials_fails() {
		let host = CloudinaryHost::new(None);

		let err = host
			.upload(Bytes::from_static(b"png"), UploadOptions::new("posts/u1", ResourceType::Image))
			.await
			.unwrap_err();
		assert!(matches!(err, MediaError::NotConfigured));

		let err = host.upload(Bytes::new(), UploadOptions::new("posts/u1", ResourceType::Image)).await.unwrap_err();
		assert!(matches!(err, MediaError::EmptyInput));
	}
}
