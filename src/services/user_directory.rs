use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::adapters::repositories::Repository;
use crate::adapters::store::{DocumentStore, StoreError};
use crate::common::pagination::{Page, PageOf};
use crate::domain::user::{password::hash_password, CreateUser, User, UserView};

use super::response::ServiceError;

const EMAIL_TAKEN: &str = "Email already registered";
const NAME_TAKEN: &str = "Username already taken";

#[derive(Clone)]
pub struct UserDirectory {
	users: Repository<User>,
}

impl UserDirectory {
	pub fn new(store: Arc<dyn DocumentStore>) -> Self {
		Self {
			users: Repository::new(store),
		}
	}

	pub async fn init(&self) -> Result<(), ServiceError> {
		Ok(self.users.init().await?)
	}

	pub async fn create(
		&self,
		input: CreateUser,
	) -> Result<UserView, ServiceError> {
		input.validate().map_err(|err| ServiceError::InvalidArgument(err.to_string()))?;

		if let Some(existing) = self.users.find_by_email_or_name(&input.email, &input.name).await? {
			let message = if existing.email == input.email { EMAIL_TAKEN } else { NAME_TAKEN };
			return Err(ServiceError::DuplicateUser(message.into()));
		}

		// Argon2 is CPU bound, hash off the async workers.
		let password = input.password;
		let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
			.await
			.map_err(|err| ServiceError::Internal(err.to_string()))??;

		let now = Utc::now();
		let user = User {
			id: Uuid::new_v4(),
			email: input.email,
			name: input.name,
			password_hash,
			created_at: now,
			updated_at: now,
		};

		match self.users.add(&user).await {
			Ok(()) => {
				tracing::info!(user_id = %user.id, "user created");
				Ok(user.into())
			}
			Err(StoreError::Duplicate { index }) => {
				let message = if index == "email" { EMAIL_TAKEN } else { NAME_TAKEN };
				Err(ServiceError::DuplicateUser(message.into()))
			}
			Err(err) => Err(err.into()),
		}
	}

	pub async fn list(
		&self,
		page: Page,
	) -> Result<PageOf<UserView>, ServiceError> {
		Ok(self.users.list(page).await?)
	}
}
