// info.rs — Print the trusted side's system info as JSON.

use std::sync::Arc;

use quire_bridge::{channel, BridgeHost, FileBridge};
use quire_fs::{FileService, ScriptedPicker};
use quire_protocol::{Outcome, Payload};

pub fn execute() -> anyhow::Result<()> {
    let host = Arc::new(BridgeHost::new(FileService::new(ScriptedPicker::cancelling())));

    let rt = tokio::runtime::Runtime::new()?;
    let response = rt.block_on(async {
        let (client, _task) = channel(host);
        client.get_system_info().await
    })?;

    match response.outcome {
        Outcome::Success(Payload::SystemInfo { info }) => {
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }
        Outcome::Failure(failure) => anyhow::bail!("{}", failure),
        other => anyhow::bail!("unexpected response to get-system-info: {:?}", other),
    }
}
