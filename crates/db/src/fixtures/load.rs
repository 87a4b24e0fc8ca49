//! Apply fixture records to the database, all or nothing.

use smuggler_core::fixture::{FieldValue, FixtureError, FixtureRecord};
use smuggler_core::registry::{FieldKind, ModelMeta, ModelRegistry};
use sqlx::query_builder::Separated;
use sqlx::{QueryBuilder, Sqlite, Transaction};

use super::quote_ident;
use crate::DbPool;

/// Totals reported after a successful load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Records written.
    pub objects: usize,
    /// Fixture files processed.
    pub files: usize,
}

/// An open load: every file applied through it shares one transaction.
///
/// Dropping the value without calling [`FixtureLoad::commit`] rolls every
/// applied record back.
pub struct FixtureLoad<'r> {
    tx: Transaction<'static, Sqlite>,
    registry: &'r ModelRegistry,
    summary: LoadSummary,
}

impl<'r> FixtureLoad<'r> {
    pub async fn begin(pool: &DbPool, registry: &'r ModelRegistry) -> Result<Self, FixtureError> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| FixtureError::Database(e.to_string()))?;
        Ok(Self {
            tx,
            registry,
            summary: LoadSummary::default(),
        })
    }

    /// Apply the records of one fixture file.
    pub async fn apply_file(&mut self, records: &[FixtureRecord]) -> Result<(), FixtureError> {
        for record in records {
            self.apply_record(record).await?;
            self.summary.objects += 1;
        }
        self.summary.files += 1;
        Ok(())
    }

    /// Commit everything applied so far.
    pub async fn commit(self) -> Result<LoadSummary, FixtureError> {
        self.tx
            .commit()
            .await
            .map_err(|e| FixtureError::Database(e.to_string()))?;
        Ok(self.summary)
    }

    async fn apply_record(&mut self, record: &FixtureRecord) -> Result<(), FixtureError> {
        let registry = self.registry;
        let model = registry
            .find_by_identifier(&record.model)
            .ok_or_else(|| FixtureError::UnknownModel(record.model.clone()))?;

        let record_error = |detail: String| FixtureError::Record {
            model: model.identifier(),
            pk: record.pk_display(),
            detail,
        };

        let pk = FieldValue::coerce(FieldKind::Integer, &record.pk).map_err(&record_error)?;

        let mut columns = Vec::with_capacity(record.fields.len());
        for (name, value) in &record.fields {
            let field = model.find_field(name).ok_or_else(|| FixtureError::UnknownField {
                model: model.identifier(),
                field: name.clone(),
            })?;
            let value = FieldValue::coerce(field.kind, value)
                .map_err(|detail| record_error(format!("{name}: {detail}")))?;
            columns.push((field.name.as_str(), value));
        }

        let mut query = build_upsert(model, pk, columns);
        query
            .build()
            .execute(&mut *self.tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) => record_error(db.message().to_string()),
                other => record_error(other.to_string()),
            })?;
        Ok(())
    }
}

/// Load several fixture files in one transaction.
pub async fn load_all(
    pool: &DbPool,
    registry: &ModelRegistry,
    files: &[Vec<FixtureRecord>],
) -> Result<LoadSummary, FixtureError> {
    let mut load = FixtureLoad::begin(pool, registry).await?;
    for records in files {
        load.apply_file(records).await?;
    }
    load.commit().await
}

/// `INSERT`, or update in place when a row with the same primary key exists.
///
/// A record without a primary key is always a plain insert.
fn build_upsert<'a>(
    model: &ModelMeta,
    pk: FieldValue,
    columns: Vec<(&str, FieldValue)>,
) -> QueryBuilder<'a, Sqlite> {
    let has_pk = pk != FieldValue::Null;
    let mut query = QueryBuilder::new("INSERT INTO ");
    query.push(quote_ident(&model.table));

    if !has_pk && columns.is_empty() {
        query.push(" DEFAULT VALUES");
        return query;
    }

    query.push(" (");
    {
        let mut names = query.separated(", ");
        if has_pk {
            names.push(quote_ident(&model.pk_column));
        }
        for (name, _) in &columns {
            names.push(quote_ident(name));
        }
    }
    query.push(") VALUES (");
    {
        let mut values = query.separated(", ");
        if has_pk {
            push_value(&mut values, pk);
        }
        for (_, value) in &columns {
            push_value(&mut values, value.clone());
        }
    }
    query.push(")");

    if has_pk {
        query.push(" ON CONFLICT(");
        query.push(quote_ident(&model.pk_column));
        if columns.is_empty() {
            query.push(") DO NOTHING");
        } else {
            query.push(") DO UPDATE SET ");
            let mut updates = query.separated(", ");
            for (name, _) in &columns {
                let column = quote_ident(name);
                updates.push(format!("{column} = excluded.{column}"));
            }
        }
    }

    query
}

fn push_value<'a>(values: &mut Separated<'_, 'a, Sqlite, &'static str>, value: FieldValue) {
    match value {
        FieldValue::Null => values.push_bind(Option::<i64>::None),
        FieldValue::Integer(i) => values.push_bind(i),
        FieldValue::Float(f) => values.push_bind(f),
        FieldValue::Boolean(b) => values.push_bind(b),
        FieldValue::Text(s) => values.push_bind(s),
    };
}
