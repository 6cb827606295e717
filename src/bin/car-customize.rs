//! Loads a car model, applies a customization and prints how every part was treated.
//!
//! ```text
//! car-customize models/sedan.glb --body-color '#1e293b' --wheel-scale 1.1 --finish matte
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;

    use anyhow::Context;
    use car_customizer::{
        CustomizationSession, Finish, Rgb, classify,
        config::CustomizerConfig,
        data_structures::scene_graph::SceneGraph,
        init_logger,
        resources::{AssetStore, FsAssetStore, HttpAssetStore, SceneLoader},
    };
    use clap::Parser;

    #[derive(Parser, Debug)]
    #[command(version, about = "Apply colors, finish and wheel size to a glTF car model")]
    struct Args {
        /// Asset reference, relative to the asset root or base URL.
        asset: String,

        /// TOML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Local asset directory; overrides the configuration.
        #[arg(long)]
        root: Option<PathBuf>,

        #[arg(long)]
        body_color: Option<Rgb>,

        #[arg(long)]
        wheel_color: Option<Rgb>,

        /// Clamped into the configured wheel scale range.
        #[arg(long)]
        wheel_scale: Option<f32>,

        /// `glossy` or `matte`.
        #[arg(long)]
        finish: Option<Finish>,
    }

    pub async fn main() -> anyhow::Result<()> {
        init_logger();
        let args = Args::parse();

        let mut config = match &args.config {
            Some(path) => CustomizerConfig::load(path)?,
            None => {
                let mut config = CustomizerConfig::default();
                config.apply_env();
                config
            }
        };
        if let Some(root) = &args.root {
            config.assets.root = root.clone();
            config.assets.base_url = None;
        }

        match config.assets.base_url.clone() {
            Some(base_url) => {
                let loader = SceneLoader::new(HttpAssetStore::new(&base_url)?);
                run(&args, &config, &loader).await
            }
            None => {
                let loader = SceneLoader::new(FsAssetStore::new(config.assets.root.clone()));
                run(&args, &config, &loader).await
            }
        }
    }

    async fn run<S: AssetStore>(
        args: &Args,
        config: &CustomizerConfig,
        loader: &SceneLoader<S>,
    ) -> anyhow::Result<()> {
        let mut session = CustomizationSession::from_config(config);
        session
            .load(loader, args.asset.as_str())
            .await
            .with_context(|| format!("could not load {}", args.asset))?;

        let mut request = *session.request();
        if let Some(color) = args.body_color {
            request = request.with_body_color(color);
        }
        if let Some(color) = args.wheel_color {
            request = request.with_wheel_color(color);
        }
        if let Some(scale) = args.wheel_scale {
            request = request.with_wheel_scale(config.clamp_wheel_scale(scale));
        }
        if let Some(finish) = args.finish {
            request = request.with_finish(finish);
        }
        let summary = session.customize(request)?;

        if let Some(graph) = session.graph() {
            print_graph(graph);
        }
        println!(
            "{} wheel(s), {} body part(s), {} unclassified. State: {:?}",
            summary.wheels,
            summary.bodies,
            summary.unclassified,
            session.state()
        );
        if let Some(file_id) = session.model_id() {
            println!("View: {}", loader.store().view_url(file_id));
        }
        Ok(())
    }

    fn print_graph(graph: &SceneGraph) {
        for id in graph.traverse() {
            let Some(node) = graph.node(id) else { continue };
            let mut depth = 0;
            let mut parent = node.parent();
            while let Some(p) = parent {
                depth += 1;
                parent = graph.node(p).and_then(|n| n.parent());
            }
            let detail = match node.material() {
                Some(material) => format!(
                    "{:?} {} metal {:.1} rough {:.1} scale {:.2} y {:.3}",
                    classify(&node.name),
                    material.base_color,
                    material.metalness(),
                    material.roughness(),
                    node.transform.scale.x,
                    node.transform.position.y
                ),
                None => format!("{:?}", node.kind),
            };
            println!("{}{} [{detail}]", "  ".repeat(depth), node.name);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
