//! Read registered models out of the database as fixture records.

use indexmap::IndexMap;
use serde_json::Value;
use smuggler_core::fixture::FixtureRecord;
use smuggler_core::registry::{FieldKind, ModelMeta};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::quote_ident;
use crate::DbPool;

/// Dump every row of the given models.
///
/// Models are emitted in the order given, rows ordered by primary key and
/// fields in registry order.
pub async fn dump_models(
    pool: &DbPool,
    models: &[&ModelMeta],
) -> Result<Vec<FixtureRecord>, sqlx::Error> {
    let mut records = Vec::new();

    for model in models {
        let columns: Vec<String> = std::iter::once(model.pk_column.as_str())
            .chain(model.fields.iter().map(|f| f.name.as_str()))
            .map(quote_ident)
            .collect();
        let query = format!(
            "SELECT {} FROM {} ORDER BY {}",
            columns.join(", "),
            quote_ident(&model.table),
            quote_ident(&model.pk_column),
        );

        let rows = sqlx::query(&query).fetch_all(pool).await?;
        tracing::debug!(model = %model.identifier(), rows = rows.len(), "Dumped model");

        let identifier = model.identifier();
        for row in rows {
            let pk: i64 = row.try_get_unchecked(0)?;
            let mut fields = IndexMap::with_capacity(model.fields.len());
            for (offset, field) in model.fields.iter().enumerate() {
                fields.insert(field.name.clone(), read_value(&row, offset + 1, field.kind)?);
            }
            records.push(FixtureRecord {
                model: identifier.clone(),
                pk: Value::from(pk),
                fields,
            });
        }
    }

    Ok(records)
}

/// Read one column as JSON.
///
/// SQLite columns are dynamically typed, so values are decoded by the
/// registry's declared kind rather than the column's declared type.
fn read_value(row: &SqliteRow, index: usize, kind: FieldKind) -> Result<Value, sqlx::Error> {
    Ok(match kind {
        FieldKind::Integer => row
            .try_get_unchecked::<Option<i64>, _>(index)?
            .map_or(Value::Null, Value::from),
        FieldKind::Float => row
            .try_get_unchecked::<Option<f64>, _>(index)?
            .map_or(Value::Null, Value::from),
        FieldKind::Boolean => row
            .try_get_unchecked::<Option<i64>, _>(index)?
            .map_or(Value::Null, |v| Value::Bool(v != 0)),
        FieldKind::Text | FieldKind::DateTime => row
            .try_get_unchecked::<Option<String>, _>(index)?
            .map_or(Value::Null, Value::String),
    })
}
