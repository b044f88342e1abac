use std::path::Path;

use anyhow::Context;

use hl_storage::{S3Client, S3Config};
use hl_transcode::describe_endpoint;
use hl_worker::{PipelineConfig, StorageBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;
    dotenvy::dotenv().ok();

    let config = PipelineConfig::from_env().context("invalid configuration")?;
    println!(
        "hl-selfcheck: starting for league={} date={}",
        config.league, config.date
    );
    for warning in &config.warnings {
        println!("hl-selfcheck: warning: {}", warning);
    }

    if let Some(dir) = &config.work_dir {
        ensure_workdir(dir).await?;
    }
    ensure_env_present(&["RAPIDAPI_KEY"])?;
    ensure_storage(&config).await?;

    if config.transcode.is_some() {
        let endpoint = describe_endpoint(&config.region)
            .await
            .context("MediaConvert endpoint lookup failed")?;
        println!("hl-selfcheck: mediaconvert endpoint {}", endpoint);
    }

    println!("hl-selfcheck: ok");
    Ok(())
}

async fn ensure_workdir(path: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("cannot create work dir {}", path.display()))?;
    Ok(())
}

async fn ensure_storage(config: &PipelineConfig) -> anyhow::Result<()> {
    let buckets = [
        &config.buckets.metadata,
        &config.buckets.video,
        &config.buckets.log,
    ];

    match &config.storage {
        StorageBackend::S3 { endpoint_url } => {
            let client = S3Client::new(S3Config {
                region: config.region.clone(),
                endpoint_url: endpoint_url.clone(),
            })
            .await;
            for bucket in buckets.into_iter().flatten() {
                client.check_connectivity(bucket).await?;
                println!("hl-selfcheck: bucket {} reachable", bucket);
            }
        }
        StorageBackend::Local { root } => {
            for bucket in buckets.into_iter().flatten() {
                ensure_workdir(&root.join(bucket)).await?;
            }
        }
    }
    Ok(())
}

fn ensure_env_present(vars: &[&str]) -> anyhow::Result<()> {
    for var in vars {
        if std::env::var(var).map_or(true, |v| v.is_empty()) {
            return Err(anyhow::anyhow!("missing required env var {}", var));
        }
    }
    Ok(())
}
