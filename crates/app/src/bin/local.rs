// TypeCraft - Local Development Walkthrough
//
// Runs the demo-session flow end to end against in-memory stores and mock
// collaborators: start a demo session, generate a free specimen, export it
// for credits, and show that durable session events cannot displace the demo
// identity.

use tracing::info;

use typecraft_auth::SessionEvent;
use typecraft_engine::SpecimenRequest;
use typecraft_exports::ExportRequest;
use typecraft_fonts::{FontDraft, FontFiles};

const DEMO_EMAIL: &str = "demo@typecraft.ai";
const DEMO_SEED_CREDITS: i32 = 100;
const EXPORT_COST: i32 = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "typecraft=debug,info".into()),
        )
        .pretty()
        .init();

    info!("Starting TypeCraft local walkthrough");

    let core = typecraft_app::create_demo_core()?;

    // A demo session is created locally and never synced.
    let identity = core.resolver.start_demo(DEMO_EMAIL, DEMO_SEED_CREDITS)?;
    info!(%identity, credits = DEMO_SEED_CREDITS, "Demo session active");

    // Previews are free and leave no trace in the ledger.
    let preview = core
        .engine
        .generate(SpecimenRequest::from_prompt(
            "A clean modern sans serif for a tech startup",
        ))
        .await?;
    info!(preview = %preview.image_url, "Specimen preview generated");

    // Exporting is the billable step.
    let font = core
        .exports
        .execute(
            &identity,
            ExportRequest {
                draft: FontDraft {
                    family_name: "Acme Sans".to_string(),
                    prompt: "A clean modern sans serif for a tech startup".to_string(),
                    preview_url: Some(preview.image_url),
                },
                files: FontFiles::woff2("https://cdn.typecraft.ai/demo/acme-sans-v1.woff2"),
                cost: EXPORT_COST,
            },
        )
        .await?;
    info!(font = %font.id, status = %font.status, "Font exported");

    let balance = core.ledger.balance(&identity).await?;
    info!(balance, "Balance after export");

    // A durable "session absent" signal does not displace the demo identity.
    core.resolver.observe(SessionEvent::Absent).await?;
    let still_active = core
        .resolver
        .resolve()
        .ok_or_else(|| anyhow::anyhow!("demo identity was displaced"))?;
    info!(identity = %still_active, "Identity unchanged after durable session signal");

    for font in core.catalog.list(&still_active).await? {
        info!(font = %font.id, family = %font.family_name, status = %font.status, "Owned font");
    }
    for entry in core.ledger.history(&still_active).await? {
        info!(delta = entry.delta, reason = %entry.reason, "Ledger entry");
    }

    core.resolver.end_session();
    info!("Walkthrough complete");
    Ok(())
}
