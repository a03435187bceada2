use super::Settings;
use crate::output::UserOutput;
use slink::{DelegationClient, LinkSubmission, SqliteLinkStore};
use std::sync::Arc;

/// Validate a link and write it straight to the database.
pub async fn run_add(
    settings: &Settings,
    submission: LinkSubmission,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    // reject before touching the database
    submission.validate()?;

    let store = SqliteLinkStore::open(&settings.config.database).await?;
    let client = DelegationClient::direct(Arc::new(store));
    let created = client.submit(&submission).await?;

    out.success(&format!("{} (id {})", created.message, created.id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::RecordingOutput;
    use slink::{Config, SortOrder};
    use tempfile::TempDir;

    fn settings(temp_dir: &TempDir) -> Settings {
        let mut config = Config::default();
        config.database.path = temp_dir.path().join("links.db");
        Settings {
            config,
            config_path: None,
        }
    }

    #[tokio::test]
    async fn test_add_prints_new_id() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings(&temp_dir);
        let out = RecordingOutput::default();

        let submission = LinkSubmission::new(" Example ", "https://example.com").with_type(4);
        run_add(&settings, submission, &out).await.unwrap();
        assert_eq!(out.text(), "Link added successfully! (id 1)");

        let store = SqliteLinkStore::open(&settings.config.database).await.unwrap();
        let rows = store.recent(SortOrder::Desc, 10).await.unwrap();
        assert_eq!(rows[0].description, "Example");
        assert_eq!(rows[0].type_id, Some(4));
    }

    #[tokio::test]
    async fn test_add_rejects_blank_url_without_creating_database() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings(&temp_dir);
        let out = RecordingOutput::default();

        let err = run_add(&settings, LinkSubmission::new("Example", " "), &out)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("URL"));
        assert!(!settings.config.database.path.exists());
        assert_eq!(out.text(), "");
    }
}
