//! bake-export - skinned asset baker
//!
//! Converts imported scenes (glTF, GLB, JSON scene descriptions) to the baked
//! binary formats (.mesh, .mats, .anim)

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use bake_export::batch::{self, BatchConfig};
use bake_export::{
    animation, manifest, material, mesh, CompactionStrategy, ExportOptions, ImportSession, InfluencePolicy,
    Skeleton, BAKE_FORMAT,
};

#[derive(Parser)]
#[command(name = "bake-export")]
#[command(about = "Skinned asset baker")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Compaction {
    Linear,
    Hashed,
}

#[derive(clap::Args)]
struct MeshArgs {
    /// Vertex deduplication strategy
    #[arg(long, value_enum, default_value = "hashed")]
    compaction: Compaction,

    /// Evict the weakest influence instead of the first weaker one
    #[arg(long)]
    replace_weakest: bool,

    /// Fail on skin clusters not bound to a skeleton joint
    #[arg(long)]
    strict: bool,
}

impl MeshArgs {
    fn options(&self) -> ExportOptions {
        ExportOptions {
            influence_policy: if self.replace_weakest {
                InfluencePolicy::ReplaceWeakest
            } else {
                InfluencePolicy::FirstEligible
            },
            compaction: match self.compaction {
                Compaction::Linear => CompactionStrategy::Linear,
                Compaction::Hashed => CompactionStrategy::Hashed,
            },
            strict_joint_binding: self.strict,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build assets from a manifest file
    Build {
        /// Path to bake.toml manifest
        #[arg(default_value = "bake.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without building
    Check {
        /// Path to bake.toml manifest
        #[arg(default_value = "bake.toml")]
        manifest: PathBuf,
    },

    /// Export every scene file in a directory
    Batch {
        /// Directory to scan
        dir: PathBuf,

        /// Output directory (default: next to each input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Scene file extensions to pick up
        #[arg(short, long, value_delimiter = ',', default_value = "glb,gltf")]
        extensions: Vec<String>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        #[command(flatten)]
        tuning: MeshArgs,
    },

    /// Export a single mesh
    Mesh {
        /// Input scene file (glTF/GLB/JSON)
        input: PathBuf,

        /// Output .mesh file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Mesh or node name (default: first mesh)
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        tuning: MeshArgs,
    },

    /// Export the material table
    Materials {
        /// Input scene file (glTF/GLB/JSON)
        input: PathBuf,

        /// Output .mats file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Bake the active animation stack
    Animation {
        /// Input scene file (glTF/GLB/JSON)
        input: PathBuf,

        /// Output .anim file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the total polygon count of a scene
    PolyCount {
        /// Input scene file (glTF/GLB/JSON)
        input: PathBuf,
    },

    /// List the meshes, materials, skeleton and animation stacks of a scene
    Info {
        /// Input scene file (glTF/GLB/JSON)
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            manifest,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building assets from {:?}", manifest);
            }
            let config = manifest::load_manifest(&manifest)?;
            manifest::build_all(&config, output.as_deref())?;
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Batch {
            dir,
            output,
            extensions,
            recursive,
            tuning,
        } => {
            let config = BatchConfig {
                dir: Some(dir.clone()),
                extensions,
                recursive,
            };
            let report = batch::run_batch(&dir, &config, &tuning.options(), output.as_deref())?;
            for file in &report.files {
                for asset in &file.assets {
                    match &asset.result {
                        Ok(()) => println!("ok    {:?}", asset.output),
                        Err(err) => println!("FAIL  {:?} ({}): {}", asset.output, err.code(), err),
                    }
                }
            }
            if report.failed() > 0 {
                anyhow::bail!("{} of {} exports failed", report.failed(), report.failed() + report.exported());
            }
        }

        Commands::Mesh {
            input,
            output,
            name,
            tuning,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(BAKE_FORMAT.mesh_ext));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            mesh::export_simple_mesh(&input, &output, name.as_deref(), &tuning.options())?;
            tracing::info!("Done!");
        }

        Commands::Materials { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension(BAKE_FORMAT.material_ext));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            material::export_materials(&input, &output)?;
            tracing::info!("Done!");
        }

        Commands::Animation { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension(BAKE_FORMAT.animation_ext));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            animation::export_animation(&input, &output)?;
            tracing::info!("Done!");
        }

        Commands::PolyCount { input } => {
            println!("{}", bake_export::scene_poly_count(&input)?);
        }

        Commands::Info { input } => {
            let session = ImportSession::open(&input)?;
            print_info(&session);
        }
    }

    Ok(())
}

fn print_info(session: &ImportSession) {
    let scene = session.scene();
    println!("{:?}", session.path());
    println!("  polygons: {}", scene.poly_count());

    println!("  meshes:");
    for (_, node, geometry) in scene.mesh_nodes() {
        println!(
            "    {} (node '{}'): {} polygons, {} control points, {} skin deformers",
            geometry.name,
            node.name,
            geometry.polygon_count(),
            geometry.control_point_count(),
            geometry.skins.len()
        );
    }

    println!("  materials:");
    for material in &scene.materials {
        println!("    {} ({:?})", material.name, material.shading);
    }

    match Skeleton::from_bind_pose(scene) {
        Ok(skeleton) => {
            println!("  skeleton: {} joints", skeleton.len());
            for joint in skeleton.joints() {
                println!("    {} (parent {})", joint.name, joint.parent_index);
            }
        }
        Err(err) => println!("  skeleton: none ({})", err),
    }

    println!("  animation stacks:");
    for (index, stack) in scene.animation_stacks.iter().enumerate() {
        let active = scene.active_stack().is_some_and(|s| std::ptr::eq(s, stack));
        println!(
            "    [{}] {}: frames {}..{}{}",
            index,
            stack.name,
            animation::frame_index(stack.start),
            animation::frame_index(stack.stop),
            if active { " (active)" } else { "" }
        );
    }
}
