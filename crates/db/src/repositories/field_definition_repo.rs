//! Repository for field definitions (`account_infos`, `account_actions`,
//! `game_infos`), selected by [`Scope`].

use market_core::submission::{FieldRule, Scope};
use market_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::field_definition::{
    CreateFieldDefinition, FieldDefinition, FieldDefinitionWithRule, UpdateFieldDefinition,
};
use crate::repositories::RuleRepo;

/// Table name and owner column for a scope.
fn table(scope: Scope) -> (&'static str, &'static str) {
    match scope {
        Scope::AccountInfos => ("account_infos", "account_type_id"),
        Scope::AccountActions => ("account_actions", "account_type_id"),
        Scope::GameInfos => ("game_infos", "game_id"),
    }
}

fn columns(scope: Scope) -> String {
    let (_, owner) = table(scope);
    let video = if scope == Scope::AccountActions {
        "video_path"
    } else {
        "NULL::text AS video_path"
    };
    format!(
        "id, {owner} AS owner_id, rule_id, \"order\", name, slug, description, {video}, \
         creator_id, latest_updater_id, created_at, updated_at"
    )
}

pub struct FieldDefinitionRepo;

impl FieldDefinitionRepo {
    /// Insert a definition pointing at an already-created rule.
    pub async fn create(
        conn: &mut PgConnection,
        scope: Scope,
        owner_id: DbId,
        rule_id: DbId,
        input: &CreateFieldDefinition,
        slug: &str,
        creator_id: DbId,
    ) -> Result<FieldDefinition, sqlx::Error> {
        let (table, owner) = table(scope);
        let cols = columns(scope);
        let (video_col, video_val) = if scope == Scope::AccountActions {
            (", video_path", ", $8")
        } else {
            ("", "")
        };
        let query = format!(
            "INSERT INTO {table} ({owner}, rule_id, \"order\", name, slug, description,
                                  creator_id, latest_updater_id{video_col})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7{video_val})
             RETURNING {cols}"
        );
        let mut q = sqlx::query_as::<_, FieldDefinition>(&query)
            .bind(owner_id)
            .bind(rule_id)
            .bind(input.order)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description)
            .bind(creator_id);
        if scope == Scope::AccountActions {
            q = q.bind(&input.video_path);
        }
        q.fetch_one(&mut *conn).await
    }

    /// Find a definition by id. Excludes soft-deleted rows.
    pub async fn find_by_id(
        pool: &PgPool,
        scope: Scope,
        id: DbId,
    ) -> Result<Option<FieldDefinition>, sqlx::Error> {
        let (table, _) = table(scope);
        let cols = columns(scope);
        let query = format!("SELECT {cols} FROM {table} WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, FieldDefinition>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Live definitions of an owner in display order.
    pub async fn list_by_owner(
        pool: &PgPool,
        scope: Scope,
        owner_id: DbId,
    ) -> Result<Vec<FieldDefinition>, sqlx::Error> {
        let (table, owner) = table(scope);
        let cols = columns(scope);
        let query = format!(
            "SELECT {cols} FROM {table}
             WHERE {owner} = $1 AND deleted_at IS NULL
             ORDER BY \"order\" NULLS LAST, id"
        );
        sqlx::query_as::<_, FieldDefinition>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Live definitions of an owner, each with its rule.
    pub async fn list_with_rules(
        pool: &PgPool,
        scope: Scope,
        owner_id: DbId,
    ) -> Result<Vec<FieldDefinitionWithRule>, sqlx::Error> {
        let definitions = Self::list_by_owner(pool, scope, owner_id).await?;
        let rule_ids: Vec<DbId> = definitions.iter().map(|d| d.rule_id).collect();
        let rules = RuleRepo::find_many(pool, &rule_ids).await?;
        definitions
            .into_iter()
            .map(|definition| {
                let rule = rules
                    .get(&definition.rule_id)
                    .cloned()
                    .ok_or(sqlx::Error::RowNotFound)?;
                Ok(FieldDefinitionWithRule { definition, rule })
            })
            .collect()
    }

    /// Field rules of an owner, ready for submission validation.
    pub async fn field_rules(
        pool: &PgPool,
        scope: Scope,
        owner_id: DbId,
    ) -> Result<Vec<FieldRule>, sqlx::Error> {
        Ok(Self::list_with_rules(pool, scope, owner_id)
            .await?
            .into_iter()
            .map(|d| FieldRule {
                field_id: d.definition.id,
                rule: d.rule,
            })
            .collect())
    }

    /// Update a definition. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no live definition with the given `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        scope: Scope,
        id: DbId,
        input: &UpdateFieldDefinition,
        slug: Option<&str>,
        updater_id: DbId,
    ) -> Result<Option<FieldDefinition>, sqlx::Error> {
        let (table, _) = table(scope);
        let cols = columns(scope);
        let video_set = if scope == Scope::AccountActions {
            ", video_path = COALESCE($7, video_path)"
        } else {
            ""
        };
        let query = format!(
            "UPDATE {table} SET
                \"order\" = COALESCE($2, \"order\"),
                name = COALESCE($3, name),
                slug = COALESCE($4, slug),
                description = COALESCE($5, description),
                latest_updater_id = $6{video_set}
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {cols}"
        );
        let mut q = sqlx::query_as::<_, FieldDefinition>(&query)
            .bind(id)
            .bind(input.order)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description)
            .bind(updater_id);
        if scope == Scope::AccountActions {
            q = q.bind(&input.video_path);
        }
        q.fetch_optional(&mut *conn).await
    }

    /// Soft-delete a definition. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, scope: Scope, id: DbId) -> Result<bool, sqlx::Error> {
        let (table, _) = table(scope);
        let query =
            format!("UPDATE {table} SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL");
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
