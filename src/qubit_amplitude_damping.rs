use std::path::Path;
use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;
use qubit_damping_sim::{
    mkdir,
    config::{ Config, DEFAULT_CONFIG_FILE },
    pipeline::simulate,
    render::{ Figure, render },
};

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let config = Config::load(Some(Path::new(DEFAULT_CONFIG_FILE)))
        .context("loading configuration")?;
    let output = &config.output;

    let traj = simulate(&config.params).context("integrating master equation")?;
    if let Some((lo, hi)) = traj.purity_range() {
        info!(points = traj.len(), min_purity = lo, max_purity = hi, "solved");
    }

    if let Some(data) = output.data_path() {
        mkdir!(parent_dir(data))
            .with_context(|| format!("creating directory for {}", data.display()))?;
        traj.write_npz(data)
            .with_context(|| format!("writing {}", data.display()))?;
        info!("wrote data to {}", data.display());
    }

    mkdir!(parent_dir(&output.image))
        .with_context(|| {
            format!("creating directory for {}", output.image.display())
        })?;
    render(&traj, &output.image, Figure::new(output.width, output.height))
        .with_context(|| format!("rendering {}", output.image.display()))?;
    info!("wrote figure to {}", output.image.display());

    info!("done");
    Ok(())
}
