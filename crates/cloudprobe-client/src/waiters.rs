//! Waits on platform state, built on [`Poller`]

use std::time::Duration;

use cloudprobe_core::{Poller, Probe, WaitConfig};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

use crate::bmh::BmhStateSource;
use crate::client::PlatformClient;
use crate::error::{ClientError, Result};
use crate::models::{Instance, InstancePhase};

/// How long an instance may sit in `Failed` before a wait gives up on it
///
/// The scheduler retries failed placements, so a `Failed` phase is not final
/// until it has persisted for this long.
pub const FAILED_RECOVERY_WINDOW: Duration = Duration::from_secs(4 * 60);

/// Wait until an instance reaches `phase`
///
/// Aborts once the instance has been `Failed` for `failed_window` in a row.
pub async fn wait_for_instance_phase(
    client: &PlatformClient,
    poller: &Poller,
    account: &str,
    instance_id: &str,
    phase: InstancePhase,
    failed_window: Duration,
) -> Result<Instance> {
    let label = format!("instance {instance_id} {phase}");
    // Shared by every check; the wait future must stay Send
    let failed_since: Mutex<Option<Instant>> = Mutex::new(None);

    let outcome = poller
        .until(&label, || {
            let failed_since = &failed_since;
            async move {
                let instance = client.get_instance(account, instance_id).await?;
                let current = instance.status.phase;

                if current == phase {
                    return Ok(Probe::Ready(instance));
                }

                let mut failed_since = failed_since.lock().await;
                if current == InstancePhase::Failed && phase != InstancePhase::Failed {
                    let since = *failed_since.get_or_insert_with(Instant::now);
                    if since.elapsed() >= failed_window {
                        warn!(
                            instance = instance_id,
                            message = %instance.status.message,
                            "instance stayed Failed past the recovery window"
                        );
                        return Ok(Probe::Abort(instance));
                    }
                } else {
                    *failed_since = None;
                }

                Ok::<_, ClientError>(Probe::Pending(instance))
            }
        })
        .await;

    outcome.into_result().map_err(ClientError::from)
}

/// Wait for an instance to become `Ready` with the configured budget
pub async fn wait_for_instance_ready(
    client: &PlatformClient,
    waits: &WaitConfig,
    account: &str,
    instance_id: &str,
) -> Result<Instance> {
    wait_for_instance_phase(
        client,
        &waits.instance_ready.poller()?,
        account,
        instance_id,
        InstancePhase::Ready,
        FAILED_RECOVERY_WINDOW,
    )
    .await
}

/// Wait until the instance is gone (the API answers 404)
pub async fn wait_for_instance_deleted(
    client: &PlatformClient,
    poller: &Poller,
    account: &str,
    instance_id: &str,
) -> Result<()> {
    let label = format!("instance {instance_id} deleted");
    let outcome = poller
        .until(&label, || async move {
            match client.get_instance(account, instance_id).await {
                Ok(instance) => Ok(Probe::Pending(Some(instance.status.phase))),
                Err(e) if e.is_not_found() => Ok(Probe::Ready(None)),
                Err(e) => Err(e),
            }
        })
        .await;

    outcome.into_result()?;
    Ok(())
}

/// Wait until an SSH key is gone
pub async fn wait_for_ssh_key_deleted(
    client: &PlatformClient,
    poller: &Poller,
    account: &str,
    name: &str,
) -> Result<()> {
    let label = format!("ssh key {name} deleted");
    let outcome = poller
        .until(&label, || async move {
            match client.get_ssh_key(account, name).await {
                Ok(_) => Ok(Probe::Pending(())),
                Err(e) if e.is_not_found() => Ok(Probe::Ready(())),
                Err(e) => Err(e),
            }
        })
        .await;

    outcome.into_result()?;
    Ok(())
}

/// Wait until a BareMetalHost reports provisioning state `state`
///
/// Returns the last observed state. A host that does not exist yet counts as
/// not ready.
pub async fn wait_for_bmh_state<S>(
    source: &S,
    poller: &Poller,
    namespace: &str,
    name: &str,
    state: &str,
) -> Result<String>
where
    S: BmhStateSource + ?Sized,
{
    let label = format!("bmh {namespace}/{name} {state}");
    let outcome = poller
        .until(&label, || async move {
            match source.provisioning_state(namespace, name).await? {
                Some(current) => Ok::<_, ClientError>(Probe::from_bool(current == state, current)),
                None => Err(ClientError::HostNotFound {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                }),
            }
        })
        .await;

    outcome.into_result().map_err(ClientError::from)
}
