pub mod password;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	pub id: Uuid,
	pub email: String,
	pub name: String,
	pub password_hash: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// What leaves the service about a user. Never carries the hash.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
	pub id: Uuid,
	pub email: String,
	pub name: String,
	pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
	fn from(user: User) -> Self {
		Self {
			id: user.id,
			email: user.email,
			name: user.name,
			created_at: user.created_at,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct CreateUser {
	#[validate(email(message = "email must be a valid address"))]
	pub email: String,
	#[validate(length(min = 3, max = 30, message = "name must be 3 to 30 characters"))]
	pub name: String,
	#[validate(length(min = 5, message = "password must be at least 5 characters"))]
	pub password: String,
}
