use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPool, Postgres, QueryBuilder, Row};

use super::{Collection, Document, DocumentStore, Filter, FindOptions, StoreError, UniqueIndex};

const UNIQUE_VIOLATION: &str = "23505";

/// Collections as Postgres tables of JSONB documents.
///
/// Each table carries `seq` for insertion order, `id` as primary key,
/// `created_at` for ordering, and the document itself in `doc`. Equality filters
/// are JSONB containment checks, unique indexes are expression indexes over the
/// listed document fields.
#[derive(Clone)]
pub struct PgDocumentStore {
	pool: PgPool,
}

impl PgDocumentStore {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	pub fn pool(&self) -> &PgPool {
		&self.pool
	}
}

/// OFFSET and LIMIT are BIGINT; anything larger is past the end anyway.
fn bigint(n: u64) -> i64 {
	i64::try_from(n).unwrap_or(i64::MAX)
}

fn is_identifier(name: &str) -> bool {
	!name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn index_name(
	collection: Collection,
	index: &UniqueIndex,
) -> String {
	format!("{}_{}_key", collection.name(), index.name)
}

fn push_filter(
	builder: &mut QueryBuilder<'_, Postgres>,
	filter: &Filter,
) {
	match filter {
		Filter::All => {
			builder.push("TRUE");
		}
		Filter::Eq(fields) => {
			builder.push("doc @> ");
			builder.push_bind(Value::Object(fields.clone()));
			builder.push("::jsonb");
		}
		Filter::AnyOf(branches) if branches.is_empty() => {
			builder.push("FALSE");
		}
		Filter::AnyOf(branches) => {
			builder.push("(");
			for (i, branch) in branches.iter().enumerate() {
				if i > 0 {
					builder.push(" OR ");
				}
				push_filter(builder, branch);
			}
			builder.push(")");
		}
	}
}

fn map_insert_error(
	collection: Collection,
	err: sqlx::Error,
) -> StoreError {
	if let sqlx::Error::Database(db_err) = &err {
		if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
			let constraint = db_err.constraint().unwrap_or_default();
			let index = if constraint == format!("{}_pkey", collection.name()) {
				"_id".to_string()
			} else {
				constraint
					.strip_prefix(&format!("{}_", collection.name()))
					.and_then(|rest| rest.strip_suffix("_key"))
					.unwrap_or(constraint)
					.to_string()
			};
			return StoreError::Duplicate { index };
		}
	}
	StoreError::Database(err)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
	async fn ensure_collection(
		&self,
		collection: Collection,
		indexes: &[UniqueIndex],
	) -> Result<(), StoreError> {
		let table = collection.name();
		sqlx::query(&format!(
			"CREATE TABLE IF NOT EXISTS {table} (
				seq BIGSERIAL,
				id TEXT PRIMARY KEY,
				created_at TIMESTAMPTZ NOT NULL,
				doc JSONB NOT NULL
			)"
		))
		.execute(&self.pool)
		.await?;

		sqlx::query(&format!("CREATE INDEX IF NOT EXISTS {table}_created_at_idx ON {table} (created_at DESC, seq DESC)"))
			.execute(&self.pool)
			.await?;

		for index in indexes {
			if !is_identifier(index.name) || !index.fields.iter().all(|field| is_identifier(field)) {
				return Err(StoreError::Serialization(format!("invalid index definition `{}`", index.name)));
			}
			let columns = index.fields.iter().map(|field| format!("(doc->>'{field}')")).collect::<Vec<_>>().join(", ");
			sqlx::query(&format!(
				"CREATE UNIQUE INDEX IF NOT EXISTS {} ON {table} ({columns})",
				index_name(collection, index)
			))
			.execute(&self.pool)
			.await?;
		}
		tracing::debug!(collection = table, indexes = indexes.len(), "collection ready");
		Ok(())
	}

	async fn insert(
		&self,
		collection: Collection,
		document: Document,
	) -> Result<String, StoreError> {
		sqlx::query(&format!("INSERT INTO {} (id, created_at, doc) VALUES ($1, $2, $3)", collection.name()))
			.bind(&document.id)
			.bind(document.created_at)
			.bind(&document.body)
			.execute(&self.pool)
			.await
			.map_err(|err| map_insert_error(collection, err))?;
		Ok(document.id)
	}

	async fn find(
		&self,
		collection: Collection,
		filter: &Filter,
		options: FindOptions,
	) -> Result<Vec<Value>, StoreError> {
		let mut builder = QueryBuilder::<Postgres>::new("SELECT doc");
		if !options.exclude.is_empty() {
			builder.push(" - ");
			builder.push_bind(options.exclude.iter().map(|field| field.to_string()).collect::<Vec<_>>());
			builder.push("::text[]");
		}
		builder.push(" AS doc FROM ");
		builder.push(collection.name());
		builder.push(" WHERE ");
		push_filter(&mut builder, filter);
		builder.push(" ORDER BY created_at DESC, seq DESC OFFSET ");
		builder.push_bind(bigint(options.skip));
		if let Some(limit) = options.limit {
			builder.push(" LIMIT ");
			builder.push_bind(bigint(limit));
		}

		let rows = builder.build().fetch_all(&self.pool).await?;
		rows.iter()
			.map(|row| row.try_get::<Value, _>("doc").map_err(StoreError::from))
			.collect()
	}

	async fn count(
		&self,
		collection: Collection,
		filter: &Filter,
	) -> Result<u64, StoreError> {
		let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM ");
		builder.push(collection.name());
		builder.push(" WHERE ");
		push_filter(&mut builder, filter);

		let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
		Ok(count as u64)
	}

	async fn delete_one(
		&self,
		collection: Collection,
		filter: &Filter,
	) -> Result<u64, StoreError> {
		let table = collection.name();
		let mut builder = QueryBuilder::<Postgres>::new(format!("DELETE FROM {table} WHERE id = (SELECT id FROM {table} WHERE "));
		push_filter(&mut builder, filter);
		builder.push(" LIMIT 1)");

		let result = builder.build().execute(&self.pool).await?;
		Ok(result.rows_affected())
	}

	async fn ping(&self) -> Result<(), StoreError> {
		sqlx::query("SELECT 1")
			.execute(&self.pool)
			.await
			.map_err(|err| StoreError::Unavailable(err.to_string()))?;
		Ok(())
	}
}
