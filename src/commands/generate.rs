//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::Site;

/// Export the whole site into the public directory
pub fn run(site: &Site) -> Result<()> {
    let start = std::time::Instant::now();

    let stats = Generator::new(site)?.generate()?;

    tracing::info!(
        "Generated {} posts, {} pages and {} static files into {:?}",
        stats.posts,
        stats.pages,
        stats.assets,
        site.public_dir
    );
    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}
