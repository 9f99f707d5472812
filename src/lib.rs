pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod material;
pub mod providers;
pub mod rotation;

use log::info;

use crate::cli::{Cli, Commands};
use crate::core::errors::RotationError;
use crate::material::read_material;
use crate::providers::{CdnDiscoveryAdapter, EdgeOneAdapter, SslCertificateAdapter};
use crate::rotation::{EdgeOneDeployer, RotationOrchestrator, ThreadSleeper};

/// Runs one parsed command end to end against Tencent Cloud.
pub fn run(cli: Cli) -> Result<(), RotationError> {
    match cli.command {
        Commands::Rotate(args) => {
            let config = args.cloud_config()?;
            let settings = args.settings();
            let material = read_material(&args.common.fullchain_file, &args.common.key_file)?;

            let certificates = SslCertificateAdapter::new(&config);
            let discovery = CdnDiscoveryAdapter::new(&config);
            let mut orchestrator =
                RotationOrchestrator::new(&certificates, &discovery, &settings, &ThreadSleeper);
            let summary = orchestrator.run(&material, &args.domains)?;
            info!(
                "Rotation complete: new certificate {}, replaced [{}]",
                summary.new_cert_id,
                summary
                    .old_cert_ids
                    .iter()
                    .map(|id| id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        Commands::EdgeOne(args) => {
            let config = args.cloud_config()?;
            let material = read_material(&args.common.fullchain_file, &args.common.key_file)?;

            let certificates = SslCertificateAdapter::new(&config);
            let edge = EdgeOneAdapter::new(&config);
            let summary = EdgeOneDeployer::new(&certificates, &edge).deploy(
                &material,
                &args.site_id,
                &args.hosts,
            )?;
            info!(
                "EdgeOne deploy complete: certificate {} on site {} (RequestId: {})",
                summary.cert_id,
                summary.site_id,
                summary.request_id.as_deref().unwrap_or("-")
            );
        }
    }
    Ok(())
}
