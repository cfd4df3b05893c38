use serde::Deserialize;

use crate::services::response::ServiceError;

pub const MAX_LIMIT: u64 = 100;

/// Raw `?page=&limit=` query. Kept as strings so malformed numbers surface as
/// `InvalidArgument` with a JSON body instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
	pub page: Option<String>,
	pub limit: Option<String>,
}

/// Offset pagination window; `page` is 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
	pub page: u64,
	pub limit: u64,
}

impl Default for Page {
	fn default() -> Self {
		Self { page: 1, limit: 10 }
	}
}

impl Page {
	pub fn new(
		page: u64,
		limit: u64,
	) -> Result<Self, ServiceError> {
		if page < 1 {
			return Err(ServiceError::InvalidArgument("page must be at least 1".into()));
		}
		check_limit(limit)?;
		Ok(Self { page, limit })
	}

	/// Saturates for absurd page numbers; such a page is simply past the end.
	pub fn skip(&self) -> u64 {
		(self.page - 1).saturating_mul(self.limit)
	}

	pub fn total_pages(
		&self,
		total: u64,
	) -> u64 {
		total.div_ceil(self.limit)
	}
}

impl TryFrom<PageQuery> for Page {
	type Error = ServiceError;
	fn try_from(query: PageQuery) -> Result<Self, Self::Error> {
		let defaults = Page::default();
		Page::new(
			parse_number("page", query.page.as_deref(), defaults.page)?,
			parse_number("limit", query.limit.as_deref(), defaults.limit)?,
		)
	}
}

pub fn check_limit(limit: u64) -> Result<u64, ServiceError> {
	if !(1..=MAX_LIMIT).contains(&limit) {
		return Err(ServiceError::InvalidArgument(format!("limit must be between 1 and {MAX_LIMIT}")));
	}
	Ok(limit)
}

pub fn parse_number(
	name: &str,
	raw: Option<&str>,
	default: u64,
) -> Result<u64, ServiceError> {
	match raw.map(str::trim) {
		None | Some("") => Ok(default),
		Some(value) => value
			.parse()
			.map_err(|_| ServiceError::InvalidArgument(format!("{name} must be a non-negative integer, got `{value}`"))),
	}
}

/// One page of results with the total number of matches.
#[derive(Debug)]
pub struct PageOf<T> {
	pub items: Vec<T>,
	pub total: u64,
	pub page: Page,
}

impl<T> PageOf<T> {
	pub fn total_pages(&self) -> u64 {
		self.page.total_pages(self.total)
	}
}

#[cfg(test)]
mod test {
	use super::{Page, PageQuery};
	use crate::services::response::ServiceError;

	fn query(
		page: Option<&str>,
		limit: Option<&str>,
	) -> PageQuery {
		PageQuery {
			page: page.map(String::from),
			limit: limit.map(String::from),
		}
	}

	#[test]
	fn test_defaults_apply() {
		let page = Page::try_from(query(None, None)).unwrap();
		assert_eq!(page, Page { page: 1, limit: 10 });
		assert_eq!(page.skip(), 0);
	}

	#[test]
	fn test_skip_and_total_pages() {
		let page = Page::try_from(query(Some("3"), Some("4"))).unwrap();
		assert_eq!(page.skip(), 8);
		assert_eq!(page.total_pages(0), 0);
		assert_eq!(page.total_pages(8), 2);
		assert_eq!(page.total_pages(9), 3);
	}

	#[test]
	fn test_huge_page_saturates_skip() {
		let page = Page::try_from(query(Some("18446744073709551615"), Some("10"))).unwrap();
		assert_eq!(page.skip(), u64::MAX);
	}

	#[test]
	fn test_out_of_range_is_invalid() {
		for (p, l) in [(Some("0"), None), (None, Some("0")), (None, Some("101")), (Some("abc"), None), (Some("-1"), None)] {
			assert!(
				matches!(Page::try_from(query(p, l)), Err(ServiceError::InvalidArgument(_))),
				"page={p:?} limit={l:?}"
			);
		}
	}
}
