use super::Settings;
use crate::output::UserOutput;
use slink::{HealthChecker, HttpProbe, SqliteLinkStore};

pub async fn run_doctor(
    settings: &Settings,
    quick: bool,
    test_db: bool,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let config = &settings.config;
    out.status("Checking slink setup...\n");

    let mut all_ok = true;

    out.progress("Config file: ");
    match &settings.config_path {
        Some(path) => out.finish_progress(&path.display().to_string()),
        None => out.finish_progress("not found, using defaults"),
    }

    let db_path = &config.database.path;
    out.progress("Database directory: ");
    match db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) if dir.is_dir() => out.finish_progress(&format!("{} (exists)", dir.display())),
        Some(dir) => out.finish_progress(&format!(
            "{} (missing, created on first use)",
            dir.display()
        )),
        None => out.finish_progress("current directory"),
    }

    out.progress("Database file: ");
    if db_path.is_file() {
        out.finish_progress(&format!("{} (exists)", db_path.display()));
    } else {
        out.finish_progress(&format!(
            "{} (missing, provisioned on first use)",
            db_path.display()
        ));
    }

    out.progress("Schema: ");
    match &config.database.schema {
        Some(schema) if schema.is_file() => out.finish_progress(&schema.display().to_string()),
        Some(schema) => {
            out.finish_progress(&format!("{} (NOT FOUND)", schema.display()));
            // only fatal when the database still needs provisioning
            if !db_path.is_file() {
                all_ok = false;
            }
        }
        None => out.finish_progress("bundled"),
    }

    out.progress("Ingestion service: ");
    if !config.ingest.enabled {
        out.finish_progress("disabled");
    } else if quick {
        out.finish_progress("skipped (--quick)");
    } else {
        let endpoint = config.ingest.endpoint()?;
        let probe = HttpProbe::new(&endpoint, config.ingest.probe_timeout);
        if probe.check().await {
            out.finish_progress(&format!("{} (healthy)", endpoint));
        } else {
            out.finish_progress(&format!(
                "{} (not answering, links are written directly)",
                endpoint
            ));
        }
    }

    if test_db {
        out.progress("Database connection: ");
        match SqliteLinkStore::open(&config.database).await {
            Ok(store) => {
                let tables = store.tables().await?;
                let count = store.count().await?;
                out.finish_progress("OK");
                out.status(&format!("  Tables: {}", tables.join(", ")));
                out.status(&format!("  Links: {}", count));
            }
            Err(e) => {
                out.finish_progress("FAILED");
                out.warning(&format!("  {}", e.with_suggestion()));
                all_ok = false;
            }
        }
    }

    out.blank();
    if all_ok {
        out.success("No problems found");
    } else {
        out.status("Some checks failed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::RecordingOutput;
    use slink::Config;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_doctor_with_test_db() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.database.path = temp_dir.path().join("db").join("links.db");
        let settings = Settings {
            config,
            config_path: None,
        };
        let out = RecordingOutput::default();

        run_doctor(&settings, true, true, &out).await.unwrap();
        let text = out.text();
        assert!(text.contains("Config file: not found, using defaults"));
        assert!(text.contains("Ingestion service: skipped (--quick)"));
        assert!(text.contains("Database connection: OK"));
        assert!(text.contains("Tables: links, type"));
        assert!(text.contains("Links: 0"));
        assert!(text.contains("No problems found"));
    }

    #[tokio::test]
    async fn test_doctor_flags_missing_schema() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.database.path = temp_dir.path().join("links.db");
        config.database.schema = Some(temp_dir.path().join("missing.sql"));
        config.ingest.enabled = false;
        let settings = Settings {
            config,
            config_path: None,
        };
        let out = RecordingOutput::default();

        run_doctor(&settings, false, false, &out).await.unwrap();
        let text = out.text();
        assert!(text.contains("(NOT FOUND)"));
        assert!(text.contains("Ingestion service: disabled"));
        assert!(text.contains("Some checks failed"));
    }
}
