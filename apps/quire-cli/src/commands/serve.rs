// serve.rs — Run the trusted file service as JSON lines on stdio.
//
// One request per stdin line, one response or notification per stdout line.
// Logs go to stderr. There is no terminal to show a dialog on, so picker
// operations come back cancelled.

use std::sync::Arc;

use quire_bridge::{serve_stream, BridgeHost};
use quire_fs::{FileService, ScriptedPicker};

use crate::config::QuireConfig;

pub fn execute(config: &QuireConfig) -> anyhow::Result<()> {
    let service = FileService::new(ScriptedPicker::cancelling()).with_filters(config.dialog.clone());
    let host = Arc::new(BridgeHost::new(service));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        tracing::info!("serving file bridge on stdio");
        serve_stream(host, tokio::io::stdin(), tokio::io::stdout())
            .await
            .map_err(|e| anyhow::anyhow!("bridge stream error: {}", e))?;
        tracing::info!("stdin closed; bridge stopped");
        Ok::<(), anyhow::Error>(())
    })
}
