use bon::bon;
use chrono::Utc;
use sqlx::{
    migrate::MigrateDatabase,
    postgres::{PgPool, PgPoolOptions},
    types::Json,
};
use std::time::Duration;
use uuid::Uuid;

use crate::{
    error::{DbError, DbResult},
    types::{
        AgentConfig, ConfigurationEntry, PromptFramework, PromptSection, ToolRecord,
        normalize_sections,
    },
};

const AGENT_CONFIG_COLUMNS: &str =
    "id, name, description, context, prompt_framework_id, profile, tools, created_at, updated_at";
const FRAMEWORK_COLUMNS: &str =
    "id, name, description, sections, is_default, created_at, updated_at";

#[derive(Debug)]
pub struct DatabaseManager {
    pub pool: PgPool,
}

#[bon]
impl DatabaseManager {
    pub async fn new(database_url: &str) -> DbResult<Self> {
        if !sqlx::Postgres::database_exists(database_url).await? {
            sqlx::Postgres::create_database(database_url).await?;
        }

        let pool = PgPoolOptions::new()
            .max_connections(50)
            .min_connections(3)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await?;

        let db_manager = DatabaseManager { pool };

        Self::run_migrations(&db_manager.pool).await?;

        Ok(db_manager)
    }

    async fn run_migrations(pool: &PgPool) -> DbResult<()> {
        let migrator = sqlx::migrate!("./src/migrations");
        migrator.run(pool).await?;
        Ok(())
    }

    // --- agent configs ---

    /// Insert a new agent config. A `prompt_framework_id` that does not
    /// resolve fails with a foreign-key violation from the database.
    #[builder]
    pub async fn create_agent_config(
        &self,
        name: String,
        description: Option<String>,
        context: String,
        prompt_framework_id: Uuid,
        profile: Option<String>,
        tools: Option<Vec<String>>,
    ) -> DbResult<AgentConfig> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        let config = sqlx::query_as::<_, AgentConfig>(&format!(
            r#"
            INSERT INTO agent_configs ({AGENT_CONFIG_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {AGENT_CONFIG_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&name)
        .bind(&description)
        .bind(&context)
        .bind(prompt_framework_id)
        .bind(&profile)
        .bind(tools.unwrap_or_default())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(config)
    }

    pub async fn get_agent_config(&self, id: Uuid) -> DbResult<AgentConfig> {
        sqlx::query_as::<_, AgentConfig>(&format!(
            "SELECT {AGENT_CONFIG_COLUMNS} FROM agent_configs WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found_with_id("agent config", id.to_string()))
    }

    pub async fn list_agent_configs(&self) -> DbResult<Vec<AgentConfig>> {
        let configs = sqlx::query_as::<_, AgentConfig>(&format!(
            "SELECT {AGENT_CONFIG_COLUMNS} FROM agent_configs ORDER BY created_at",
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(configs)
    }

    /// Case-insensitive name substring search.
    pub async fn search_agent_configs(&self, name: &str) -> DbResult<Vec<AgentConfig>> {
        let pattern = format!("%{}%", name.replace('%', "\\%").replace('_', "\\_"));
        let configs = sqlx::query_as::<_, AgentConfig>(&format!(
            "SELECT {AGENT_CONFIG_COLUMNS} FROM agent_configs WHERE name ILIKE $1 ORDER BY name",
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(configs)
    }

    /// Partial update; unspecified fields keep their stored values.
    #[builder]
    pub async fn update_agent_config(
        &self,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
        context: Option<String>,
        prompt_framework_id: Option<Uuid>,
        profile: Option<String>,
        tools: Option<Vec<String>>,
    ) -> DbResult<AgentConfig> {
        let now = Utc::now();

        sqlx::query_as::<_, AgentConfig>(&format!(
            r#"
            UPDATE agent_configs
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                context = COALESCE($4, context),
                prompt_framework_id = COALESCE($5, prompt_framework_id),
                profile = COALESCE($6, profile),
                tools = COALESCE($7, tools),
                updated_at = $8
            WHERE id = $1
            RETURNING {AGENT_CONFIG_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&name)
        .bind(&description)
        .bind(&context)
        .bind(prompt_framework_id)
        .bind(&profile)
        .bind(&tools)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found_with_id("agent config", id.to_string()))
    }

    pub async fn delete_agent_config(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM agent_configs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found_with_id("agent config", id.to_string()));
        }
        Ok(())
    }

    // --- prompt frameworks ---

    #[builder]
    pub async fn create_prompt_framework(
        &self,
        name: String,
        description: Option<String>,
        sections: Option<Vec<PromptSection>>,
        is_default: Option<bool>,
    ) -> DbResult<PromptFramework> {
        let id = Uuid::now_v7();
        let now = Utc::now();
        let sections = normalize_sections(sections.unwrap_or_default());
        let is_default = is_default.unwrap_or(false);

        let mut tx = self.pool.begin().await?;

        if is_default {
            sqlx::query("UPDATE prompt_frameworks SET is_default = FALSE WHERE is_default")
                .execute(&mut *tx)
                .await?;
        }

        let framework = sqlx::query_as::<_, PromptFramework>(&format!(
            r#"
            INSERT INTO prompt_frameworks ({FRAMEWORK_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {FRAMEWORK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&name)
        .bind(&description)
        .bind(Json(sections))
        .bind(is_default)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(framework)
    }

    pub async fn get_prompt_framework(&self, id: Uuid) -> DbResult<PromptFramework> {
        sqlx::query_as::<_, PromptFramework>(&format!(
            "SELECT {FRAMEWORK_COLUMNS} FROM prompt_frameworks WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found_with_id("prompt framework", id.to_string()))
    }

    pub async fn list_prompt_frameworks(&self) -> DbResult<Vec<PromptFramework>> {
        let frameworks = sqlx::query_as::<_, PromptFramework>(&format!(
            "SELECT {FRAMEWORK_COLUMNS} FROM prompt_frameworks ORDER BY name",
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(frameworks)
    }

    #[builder]
    pub async fn update_prompt_framework(
        &self,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
        sections: Option<Vec<PromptSection>>,
    ) -> DbResult<PromptFramework> {
        let now = Utc::now();
        let sections = sections.map(|s| Json(normalize_sections(s)));

        sqlx::query_as::<_, PromptFramework>(&format!(
            r#"
            UPDATE prompt_frameworks
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                sections = COALESCE($4, sections),
                updated_at = $5
            WHERE id = $1
            RETURNING {FRAMEWORK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&name)
        .bind(&description)
        .bind(sections)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found_with_id("prompt framework", id.to_string()))
    }

    /// Rejected with a foreign-key violation while any agent config still
    /// references the framework.
    pub async fn delete_prompt_framework(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM prompt_frameworks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found_with_id(
                "prompt framework",
                id.to_string(),
            ));
        }
        Ok(())
    }

    /// Copy a framework under a new name; the copy is never the default.
    pub async fn clone_prompt_framework(
        &self,
        id: Uuid,
        new_name: &str,
    ) -> DbResult<PromptFramework> {
        let source = self.get_prompt_framework(id).await?;
        let clone_id = Uuid::now_v7();
        let now = Utc::now();

        let framework = sqlx::query_as::<_, PromptFramework>(&format!(
            r#"
            INSERT INTO prompt_frameworks ({FRAMEWORK_COLUMNS})
            VALUES ($1, $2, $3, $4, FALSE, $5, $6)
            RETURNING {FRAMEWORK_COLUMNS}
            "#,
        ))
        .bind(clone_id)
        .bind(new_name)
        .bind(&source.description)
        .bind(&source.sections)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(framework)
    }

    /// Make one framework the default, clearing the flag everywhere else.
    pub async fn set_default_prompt_framework(&self, id: Uuid) -> DbResult<PromptFramework> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE prompt_frameworks SET is_default = FALSE WHERE is_default")
            .execute(&mut *tx)
            .await?;

        let framework = sqlx::query_as::<_, PromptFramework>(&format!(
            r#"
            UPDATE prompt_frameworks
            SET is_default = TRUE, updated_at = $2
            WHERE id = $1
            RETURNING {FRAMEWORK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found_with_id("prompt framework", id.to_string()))?;

        tx.commit().await?;

        Ok(framework)
    }

    // --- key/value configuration ---

    /// POST semantics: insert, or update the value in place when the key
    /// already exists. Never creates a duplicate key.
    pub async fn upsert_configuration(
        &self,
        key: &str,
        value: &str,
    ) -> DbResult<ConfigurationEntry> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        let entry = sqlx::query_as::<_, ConfigurationEntry>(
            r#"
            INSERT INTO configurations (id, key, value, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
            RETURNING id, key, value, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(key)
        .bind(value)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn get_configuration(&self, key: &str) -> DbResult<ConfigurationEntry> {
        sqlx::query_as::<_, ConfigurationEntry>(
            "SELECT id, key, value, created_at, updated_at FROM configurations WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found_with_id("configuration", key))
    }

    pub async fn list_configurations(&self) -> DbResult<Vec<ConfigurationEntry>> {
        let entries = sqlx::query_as::<_, ConfigurationEntry>(
            "SELECT id, key, value, created_at, updated_at FROM configurations ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    pub async fn delete_configuration(&self, key: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM configurations WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found_with_id("configuration", key));
        }
        Ok(())
    }

    // --- tool registry ---

    #[builder]
    pub async fn upsert_tool(
        &self,
        name: String,
        description: Option<String>,
        enabled: Option<bool>,
    ) -> DbResult<ToolRecord> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        // An omitted field keeps its stored value; a fresh row defaults to
        // enabled.
        let record = sqlx::query_as::<_, ToolRecord>(
            r#"
            INSERT INTO tool_registry (id, name, description, enabled, created_at, updated_at)
            VALUES ($1, $2, $3, COALESCE($4, TRUE), $5, $6)
            ON CONFLICT (name) DO UPDATE
            SET description = COALESCE($3, tool_registry.description),
                enabled = COALESCE($4, tool_registry.enabled),
                updated_at = $6
            RETURNING id, name, description, enabled, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&name)
        .bind(&description)
        .bind(enabled)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn list_tools(&self) -> DbResult<Vec<ToolRecord>> {
        let records = sqlx::query_as::<_, ToolRecord>(
            "SELECT id, name, description, enabled, created_at, updated_at \
             FROM tool_registry ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    pub async fn delete_tool(&self, name: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM tool_registry WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found_with_id("tool", name));
        }
        Ok(())
    }
}
