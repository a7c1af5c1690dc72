use anyhow::Context;
use common::domain::parse_org_id;
use common::settings::Settings;
use common::{build_all, db};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }
    if let Ok(cwd) = std::env::current_dir() {
        let candidates = [cwd.join("../.env"), cwd.join("../../.env")];
        for p in candidates {
            if p.exists() && dotenvy::from_path(&p).is_ok() {
                break;
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "skills_report=info,common=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::new().context("Failed to load configuration")?;

    // Reject a bad identifier before the driver starts monitoring the cluster.
    let org_id = parse_org_id(&settings.report.org_id)?;

    tracing::info!(
        org_id = %org_id,
        source_database = %settings.mongodb.source_database,
        report_database = %settings.mongodb.report_database,
        report_collection = %settings.report.collection,
        write_mode = ?settings.report.write_mode,
        "Report config loaded"
    );

    let client = db::establish_connection(&settings.mongodb.uri)
        .await
        .context("Failed to configure MongoDB client")?;
    let (_repos, services) = build_all(&client, &settings);

    let report = services
        .report_service
        .run_for(org_id)
        .await?;

    tracing::info!(
        deleted = report.write.deleted,
        inserted = report.write.inserted,
        failed = report.write.failures.len(),
        "Report for {} written to {}",
        report.org_id,
        settings.report.collection
    );

    for summary in &report.summaries {
        println!("{}", serde_json::to_string(summary)?);
    }

    Ok(())
}
