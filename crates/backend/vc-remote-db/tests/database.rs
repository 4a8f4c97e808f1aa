//! Integration tests against a live Postgres instance.
//!
//! Skipped unless `DATABASE_URL` is set; migrations run on connect.

use uuid::Uuid;
use vc_remote_db::{DatabaseManager, PromptSection};

async fn test_db() -> Option<DatabaseManager> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.is_empty() => url,
        _ => {
            eprintln!("DATABASE_URL not set, skipping database test");
            return None;
        }
    };
    Some(
        DatabaseManager::new(&url)
            .await
            .expect("failed to connect to test database"),
    )
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::now_v7())
}

fn section(key: &str, order: Option<i32>) -> PromptSection {
    PromptSection {
        key: key.to_string(),
        description: None,
        content: format!("content of {key}"),
        order,
    }
}

#[tokio::test]
async fn framework_sections_come_back_in_explicit_order() {
    let Some(db) = test_db().await else { return };

    let framework = db
        .create_prompt_framework()
        .name(unique("framework"))
        .sections(vec![
            section("azione", Some(2)),
            section("ruolo", Some(0)),
            section("obiettivo", Some(1)),
        ])
        .call()
        .await
        .unwrap();

    let read_back = db.get_prompt_framework(framework.id).await.unwrap();
    let keys: Vec<&str> = read_back.sections.0.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, ["ruolo", "obiettivo", "azione"]);

    // An update that leaves sections unspecified must not clobber them.
    let updated = db
        .update_prompt_framework()
        .id(framework.id)
        .description("scored".to_string())
        .call()
        .await
        .unwrap();
    assert_eq!(updated.sections.0.len(), 3);

    db.delete_prompt_framework(framework.id).await.unwrap();
}

#[tokio::test]
async fn agent_config_with_unresolvable_framework_is_rejected() {
    let Some(db) = test_db().await else { return };

    let err = db
        .create_agent_config()
        .name(unique("agent"))
        .context("chat".to_string())
        .prompt_framework_id(Uuid::now_v7())
        .call()
        .await
        .unwrap_err();

    assert!(err.is_foreign_key(), "expected FK violation, got: {err}");
}

#[tokio::test]
async fn referenced_framework_cannot_be_deleted() {
    let Some(db) = test_db().await else { return };

    let framework = db
        .create_prompt_framework()
        .name(unique("framework"))
        .call()
        .await
        .unwrap();
    let config = db
        .create_agent_config()
        .name(unique("agent"))
        .context("chat".to_string())
        .prompt_framework_id(framework.id)
        .call()
        .await
        .unwrap();

    let err = db.delete_prompt_framework(framework.id).await.unwrap_err();
    assert!(err.is_foreign_key(), "expected FK violation, got: {err}");

    // Once the reference is gone deletion goes through.
    db.delete_agent_config(config.id).await.unwrap();
    db.delete_prompt_framework(framework.id).await.unwrap();
}

#[tokio::test]
async fn configuration_upsert_updates_in_place() {
    let Some(db) = test_db().await else { return };
    let key = unique("setting");

    let first = db.upsert_configuration(&key, "v1").await.unwrap();
    let second = db.upsert_configuration(&key, "v2").await.unwrap();

    // Same row, new value; no duplicate record for the key.
    assert_eq!(second.id, first.id);
    assert_eq!(db.get_configuration(&key).await.unwrap().value, "v2");
    let matching = db
        .list_configurations()
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.key == key)
        .count();
    assert_eq!(matching, 1);

    db.delete_configuration(&key).await.unwrap();
}

#[tokio::test]
async fn tool_upsert_keeps_enabled_when_unspecified() {
    let Some(db) = test_db().await else { return };
    let name = unique("tool");

    let created = db.upsert_tool().name(name.clone()).call().await.unwrap();
    assert!(created.enabled, "a fresh tool defaults to enabled");

    let disabled = db
        .upsert_tool()
        .name(name.clone())
        .enabled(false)
        .call()
        .await
        .unwrap();
    assert!(!disabled.enabled);

    // Re-posting without the flag must not re-enable the tool.
    let merged = db
        .upsert_tool()
        .name(name.clone())
        .description("fetches a page".to_string())
        .call()
        .await
        .unwrap();
    assert!(!merged.enabled);
    assert_eq!(merged.description.as_deref(), Some("fetches a page"));

    db.delete_tool(&name).await.unwrap();
}
