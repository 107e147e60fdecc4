//! Halo - render a sphere scene from the command line.
//!
//! Writes plain PPM to stdout by default, so `halo > out.ppm` works.
//! Logs go to stderr; set `RUST_LOG=debug` for progress lines.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use halo_renderer::{
    render_cancellable, scenes, write_ppm, Camera, DiffusionKind, Hittable, HittableList,
    RenderConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SceneKind {
    /// Ground, a grid of small random spheres and three large ones
    Random,
    /// Three spheres side by side on a ground sphere
    Three,
}

#[derive(Debug, Parser)]
#[command(name = "halo", version, about = "CPU path tracer for sphere scenes")]
struct Cli {
    /// Output image width
    #[arg(long, default_value_t = 400)]
    width: u32,

    /// Output image height
    #[arg(long, default_value_t = 225)]
    height: u32,

    /// Samples per pixel
    #[arg(long)]
    samples: Option<u32>,

    /// Maximum bounces per path
    #[arg(long)]
    max_depth: Option<u32>,

    /// Worker threads, 0 = one per logical CPU
    #[arg(long)]
    jobs: Option<usize>,

    /// Seed for the scene layout and pixel sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Scatter diffuse rays as normal plus a hemisphere sample instead of Lambertian
    #[arg(long)]
    simple: bool,

    #[arg(long, value_enum, default_value_t = SceneKind::Random)]
    scene: SceneKind,

    /// Query the flat object list instead of building a BVH
    #[arg(long)]
    linear: bool,

    /// JSON render config; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output path, `-` for PPM on stdout. Non-.ppm paths are encoded
    /// by extension (e.g. .png).
    #[arg(long, default_value = "-")]
    output: PathBuf,
}

impl Cli {
    fn render_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => RenderConfig::default(),
        };

        if let Some(samples) = self.samples {
            config.samples_per_pixel = samples;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(jobs) = self.jobs {
            config.workers = jobs;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }

        config.validate().context("invalid render settings")?;
        Ok(config)
    }

    fn diffusion(&self) -> DiffusionKind {
        if self.simple {
            DiffusionKind::Simple
        } else {
            DiffusionKind::Lambertian
        }
    }

    fn scene(&self, seed: u64) -> (HittableList, Camera) {
        let diffusion = self.diffusion();
        match self.scene {
            SceneKind::Random => {
                let mut rng = StdRng::seed_from_u64(seed);
                (
                    scenes::random_spheres(&mut rng, diffusion),
                    scenes::random_spheres_camera(self.width, self.height),
                )
            }
            SceneKind::Three => (
                scenes::three_spheres(diffusion),
                scenes::three_spheres_camera(self.width, self.height),
            ),
        }
    }

    fn writes_stdout(&self) -> bool {
        self.output.as_os_str() == "-"
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if cli.width == 0 || cli.height == 0 {
        bail!("image must be at least 1x1, got {}x{}", cli.width, cli.height);
    }
    let config = cli.render_config()?;

    let (list, camera) = cli.scene(config.seed);
    log::info!("Scene {:?} with {} spheres", cli.scene, list.len());

    let world: Box<dyn Hittable> = if cli.linear {
        Box::new(list)
    } else {
        Box::new(list.into_bvh().context("building BVH")?)
    };

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let handler_cancel = cancel.clone();
        ctrlc::set_handler(move || {
            log::warn!("Interrupted, draining in-flight pixels");
            handler_cancel.store(true, Ordering::Relaxed);
        })
        .context("installing Ctrl-C handler")?;
    }

    let output = render_cancellable(&camera, world.as_ref(), &config, cancel);
    if output.cancelled {
        bail!(
            "render cancelled after {} pixels, no image written",
            output.stats.pixels
        );
    }

    if cli.writes_stdout() {
        let mut stdout = BufWriter::new(io::stdout().lock());
        write_ppm(&mut stdout, &output.image).context("writing PPM to stdout")?;
        stdout.flush().context("flushing stdout")?;
    } else {
        output
            .image
            .save(&cli.output)
            .with_context(|| format!("saving {}", cli.output.display()))?;
    }

    Ok(())
}
