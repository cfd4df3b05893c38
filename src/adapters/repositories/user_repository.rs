use chrono::{DateTime, Utc};

use super::{Repository, StoredEntity};
use crate::adapters::store::{Collection, Filter, FindOptions, StoreError, UniqueIndex};
use crate::common::pagination::{Page, PageOf};
use crate::domain::user::{User, UserView};

pub const EMAIL_INDEX: UniqueIndex = UniqueIndex::new("email", &["email"]);
pub const NAME_INDEX: UniqueIndex = UniqueIndex::new("name", &["name"]);
const PASSWORD_FIELD: &str = "passwordHash";

impl StoredEntity for User {
	const COLLECTION: Collection = Collection::Users;
	const UNIQUE_INDEXES: &'static [UniqueIndex] = &[EMAIL_INDEX, NAME_INDEX];

	fn id(&self) -> String {
		self.id.to_string()
	}
	fn created_at(&self) -> DateTime<Utc> {
		self.created_at
	}
}

impl Repository<User> {
	/// First user holding either the email or the name.
	pub async fn find_by_email_or_name(
		&self,
		email: &str,
		name: &str,
	) -> Result<Option<UserView>, StoreError> {
		let filter = Filter::AnyOf(vec![Filter::eq("email", email), Filter::eq("name", name)]);
		let found = self
			.store
			.find(User::COLLECTION, &filter, FindOptions::page(0, 1).excluding(PASSWORD_FIELD))
			.await?;
		found.into_iter().next().map(super::decode).transpose()
	}

	/// Users without the password hash; it is dropped by the store, not here.
	pub async fn list(
		&self,
		page: Page,
	) -> Result<PageOf<UserView>, StoreError> {
		self.page_as(&Filter::All, page, &[PASSWORD_FIELD]).await
	}
}
