//! Wait command - block until platform state converges

use clap::Subcommand;
use console::style;

use cloudprobe_client::{
    KubeBmhSource, PlatformClient, wait_for_bmh_state, wait_for_instance_deleted,
    wait_for_instance_ready, wait_for_ssh_key_deleted,
};
use cloudprobe_core::ProbeConfig;

use crate::error::{CliError, Result};

#[derive(Subcommand, Debug)]
pub enum WaitTarget {
    /// Wait for an instance to reach the Ready phase
    InstanceReady {
        /// Cloud account id
        #[arg(long)]
        account: String,

        /// Instance resource id
        #[arg(long)]
        instance: String,
    },

    /// Wait for an instance to disappear
    InstanceDeleted {
        #[arg(long)]
        account: String,

        #[arg(long)]
        instance: String,
    },

    /// Wait for an SSH public key to disappear
    SshKeyDeleted {
        #[arg(long)]
        account: String,

        /// Key name
        #[arg(long)]
        name: String,
    },

    /// Wait for a BareMetalHost to reach a provisioning state
    Bmh {
        #[arg(long)]
        namespace: String,

        /// Host name
        #[arg(long)]
        name: String,

        /// Expected provisioning state (e.g. available, provisioned)
        #[arg(long)]
        state: String,
    },
}

pub fn run(target: WaitTarget, config: &ProbeConfig, token: Option<String>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::internal(format!("failed to start runtime: {e}")))?;

    runtime.block_on(run_async(target, config, token))
}

async fn run_async(target: WaitTarget, config: &ProbeConfig, token: Option<String>) -> Result<()> {
    let waits = &config.waits;

    match target {
        WaitTarget::InstanceReady { account, instance } => {
            let client = PlatformClient::new(config, token)?;
            println!("{} Waiting for instance {} to be Ready", style("→").blue(), instance);
            let ready = wait_for_instance_ready(&client, waits, &account, &instance).await?;
            match ready.primary_address() {
                Some(address) => println!(
                    "{} Instance {} is Ready at {}",
                    style("✓").green(),
                    instance,
                    address
                ),
                None => println!("{} Instance {} is Ready", style("✓").green(), instance),
            }
        }

        WaitTarget::InstanceDeleted { account, instance } => {
            let client = PlatformClient::new(config, token)?;
            println!("{} Waiting for instance {} to be deleted", style("→").blue(), instance);
            let poller = waits.instance_deleted.poller()?;
            wait_for_instance_deleted(&client, &poller, &account, &instance).await?;
            println!("{} Instance {} deleted", style("✓").green(), instance);
        }

        WaitTarget::SshKeyDeleted { account, name } => {
            let client = PlatformClient::new(config, token)?;
            println!("{} Waiting for SSH key {} to be deleted", style("→").blue(), name);
            let poller = waits.ssh_key_deleted.poller()?;
            wait_for_ssh_key_deleted(&client, &poller, &account, &name).await?;
            println!("{} SSH key {} deleted", style("✓").green(), name);
        }

        WaitTarget::Bmh {
            namespace,
            name,
            state,
        } => {
            let source = KubeBmhSource::try_default().await?;
            println!(
                "{} Waiting for BareMetalHost {}/{} to be {}",
                style("→").blue(),
                namespace,
                name,
                state
            );
            let poller = waits.bmh_state.poller()?;
            wait_for_bmh_state(&source, &poller, &namespace, &name, &state).await?;
            println!(
                "{} BareMetalHost {}/{} is {}",
                style("✓").green(),
                namespace,
                name,
                state
            );
        }
    }

    Ok(())
}
