//! Repository for the `rules` table and its required roles.

use std::collections::{BTreeSet, HashMap};

use market_core::rules::Rule;
use market_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::rule::{CreateRule, RuleRecord, RuleRow};

const COLUMNS: &str = "id, type, datatype, required, multiple, min, max, minlength, maxlength, \
                       allowed_values, created_at, updated_at";

pub struct RuleRepo;

impl RuleRepo {
    /// Insert a rule and its required roles.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateRule,
    ) -> Result<RuleRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO rules (type, datatype, required, multiple, min, max, minlength, maxlength, allowed_values)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, RuleRow>(&query)
            .bind(&input.rule_type)
            .bind(input.datatype.as_str())
            .bind(input.required)
            .bind(input.multiple)
            .bind(input.min)
            .bind(input.max)
            .bind(input.minlength)
            .bind(input.maxlength)
            .bind(sqlx::types::Json(&input.values))
            .fetch_one(&mut *conn)
            .await?;

        Self::set_required_roles(conn, row.id, &input.required_role_keys).await?;
        Self::record(row, input.required_role_keys.clone())
    }

    /// Replace every attribute of a rule, including its required roles.
    ///
    /// Returns `None` if no rule with the given `id` exists.
    pub async fn replace(
        conn: &mut PgConnection,
        id: DbId,
        input: &CreateRule,
    ) -> Result<Option<RuleRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE rules SET
                type = $2, datatype = $3, required = $4, multiple = $5,
                min = $6, max = $7, minlength = $8, maxlength = $9, allowed_values = $10
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let Some(row) = sqlx::query_as::<_, RuleRow>(&query)
            .bind(id)
            .bind(&input.rule_type)
            .bind(input.datatype.as_str())
            .bind(input.required)
            .bind(input.multiple)
            .bind(input.min)
            .bind(input.max)
            .bind(input.minlength)
            .bind(input.maxlength)
            .bind(sqlx::types::Json(&input.values))
            .fetch_optional(&mut *conn)
            .await?
        else {
            return Ok(None);
        };

        Self::set_required_roles(conn, id, &input.required_role_keys).await?;
        Self::record(row, input.required_role_keys.clone()).map(Some)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RuleRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rules WHERE id = $1");
        let Some(row) = sqlx::query_as::<_, RuleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };
        let mut roles = Self::required_roles(pool, &[id]).await?;
        let record = Self::record(row, roles.remove(&id).unwrap_or_default())?;
        Ok(Some(record))
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<RuleRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rules ORDER BY id");
        let rows = sqlx::query_as::<_, RuleRow>(&query).fetch_all(pool).await?;
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let mut roles = Self::required_roles(pool, &ids).await?;
        rows.into_iter()
            .map(|row| {
                let set = roles.remove(&row.id).unwrap_or_default();
                Self::record(row, set)
            })
            .collect()
    }

    /// Load the domain rules for `ids`, keyed by rule id.
    pub async fn find_many(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<HashMap<DbId, Rule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rules WHERE id = ANY($1)");
        let rows = sqlx::query_as::<_, RuleRow>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await?;
        let mut roles = Self::required_roles(pool, ids).await?;
        rows.into_iter()
            .map(|row| {
                let id = row.id;
                let set = roles.remove(&id).unwrap_or_default();
                Ok((id, row.into_rule(set)?))
            })
            .collect()
    }

    /// Whether any field definition row, soft-deleted or not, points at the rule.
    pub async fn is_referenced(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let (referenced,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM account_infos WHERE rule_id = $1)
                 OR EXISTS (SELECT 1 FROM account_actions WHERE rule_id = $1)
                 OR EXISTS (SELECT 1 FROM game_infos WHERE rule_id = $1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(referenced)
    }

    /// Delete a rule. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_required_roles(
        conn: &mut PgConnection,
        rule_id: DbId,
        role_keys: &BTreeSet<String>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM rule_required_roles WHERE rule_id = $1")
            .bind(rule_id)
            .execute(&mut *conn)
            .await?;
        for key in role_keys {
            sqlx::query("INSERT INTO rule_required_roles (rule_id, role_key) VALUES ($1, $2)")
                .bind(rule_id)
                .bind(key)
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }

    async fn required_roles(
        pool: &PgPool,
        rule_ids: &[DbId],
    ) -> Result<HashMap<DbId, BTreeSet<String>>, sqlx::Error> {
        let rows: Vec<(DbId, String)> = sqlx::query_as(
            "SELECT rule_id, role_key FROM rule_required_roles WHERE rule_id = ANY($1)",
        )
        .bind(rule_ids)
        .fetch_all(pool)
        .await?;

        let mut out: HashMap<DbId, BTreeSet<String>> = HashMap::new();
        for (rule_id, key) in rows {
            out.entry(rule_id).or_default().insert(key);
        }
        Ok(out)
    }

    fn record(row: RuleRow, required_roles: BTreeSet<String>) -> Result<RuleRecord, sqlx::Error> {
        let created_at = row.created_at;
        let updated_at = row.updated_at;
        Ok(RuleRecord {
            rule: row.into_rule(required_roles)?,
            created_at,
            updated_at,
        })
    }
}
