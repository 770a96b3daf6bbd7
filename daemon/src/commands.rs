//! Command implementations, independent of how the ledger was built.

use std::sync::Arc;

use agora_governance::{
    apply_filters, reconstruct, summarize, FilterCriteria, PipelineOptions, ProposalSnapshot,
    Reconstructor,
};
use agora_ledger::GovernanceLedger;
use tokio::sync::broadcast;
use tracing::info;

use crate::render;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Output {
    #[default]
    Text,
    Json,
}

pub async fn list(
    ledger: &dyn GovernanceLedger,
    options: &PipelineOptions,
    criteria: &FilterCriteria,
    output: Output,
) -> anyhow::Result<String> {
    let records = reconstruct(ledger, options).await?;
    let view = apply_filters(&records, criteria);
    info!(total = records.len(), shown = view.len(), "listed proposals");
    Ok(match output {
        Output::Text => render::proposals_text(&view),
        Output::Json => render::json(&view)?,
    })
}

pub async fn analytics(
    ledger: &dyn GovernanceLedger,
    options: &PipelineOptions,
    output: Output,
) -> anyhow::Result<String> {
    let records = reconstruct(ledger, options).await?;
    let summary = summarize(&records);
    Ok(match output {
        Output::Text => render::analytics_text(&summary),
        Output::Json => render::json(&summary)?,
    })
}

fn snapshot_view(snapshot: &ProposalSnapshot, criteria: &FilterCriteria, output: Output) -> anyhow::Result<String> {
    let view = apply_filters(&snapshot.proposals, criteria);
    Ok(match output {
        Output::Text => format!(
            "== generation {} ==\n{}{}",
            snapshot.generation,
            render::proposals_text(&view),
            render::analytics_text(&snapshot.analytics)
        ),
        Output::Json => serde_json::to_string(&serde_json::json!({
            "generation": snapshot.generation,
            "proposals": view,
            "analytics": snapshot.analytics,
        }))?,
    })
}

/// Re-render on every published snapshot until `shutdown` fires. Each
/// rendered view is handed to `emit`.
pub async fn watch(
    ledger: Arc<dyn GovernanceLedger>,
    options: PipelineOptions,
    criteria: FilterCriteria,
    output: Output,
    shutdown: &broadcast::Sender<()>,
    mut emit: impl FnMut(String),
) -> anyhow::Result<()> {
    let reconstructor = Arc::new(Reconstructor::new(ledger, options));
    let mut snapshots = reconstructor.snapshots();
    let mut watcher = tokio::spawn(reconstructor.clone().watch(shutdown.subscribe()));
    let mut stop = shutdown.subscribe();

    loop {
        tokio::select! {
            biased;
            _ = stop.recv() => break,
            finished = &mut watcher => {
                finished??;
                return Ok(());
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = latest {
                    emit(snapshot_view(&snapshot, &criteria, output)?);
                }
            }
        }
    }

    watcher.await??;
    Ok(())
}
