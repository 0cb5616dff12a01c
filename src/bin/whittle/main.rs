//! Whittle CLI - mesh simplification command-line tool.
//!
//! Usage: whittle <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `whittle --help` for available commands.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use whittle::algo::simplify::Simplifier;
use whittle::io;

/// Largest accepted level-of-detail step; beyond this the face target is
/// effectively zero anyway.
const MAX_STEP: u32 = 200;

#[derive(Parser)]
#[command(name = "whittle")]
#[command(author, version, about = "Mesh simplification CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Simplify a mesh by collapsing edges
    Simplify {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Level-of-detail step; each step shrinks the face target by 5%
        #[arg(short, long, conflicts_with = "faces")]
        step: Option<u32>,

        /// Target face count
        #[arg(short, long)]
        faces: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Info { input } => cmd_info(&input),
        Commands::Simplify {
            input,
            output,
            step,
            faces,
        } => cmd_simplify(&input, &output, step, faces),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Faces: {}", mesh.num_faces());
    println!("Edges: {}", mesh.num_edges());
    println!("Surface area: {:.6}", mesh.surface_area());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    let boundary_verts = mesh
        .vertex_ids()
        .filter(|&v| mesh.vertex(v).is_boundary)
        .count();
    if boundary_verts == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!("Topology: Open ({} boundary vertices)", boundary_verts);
    }

    Ok(())
}

fn cmd_simplify(
    input: &PathBuf,
    output: &PathBuf,
    step: Option<u32>,
    faces: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;
    println!(
        "Loaded: {} vertices, {} faces",
        mesh.num_vertices(),
        mesh.num_faces()
    );

    let mut simplifier = Simplifier::new(mesh);

    let start = Instant::now();
    if let Some(target_faces) = faces {
        println!("Simplifying to {} faces...", target_faces);
        while simplifier.active_face_count() > target_faces {
            if !simplifier.collapse() {
                break;
            }
        }
    } else {
        let step = step.unwrap_or(1).min(MAX_STEP);
        println!("Simplifying to level-of-detail step {}...", step);
        for s in 0..=step {
            simplifier.advance(s);
        }
    }
    let elapsed = start.elapsed();

    println!(
        "Result: {} active faces ({} collapses)",
        simplifier.active_face_count(),
        simplifier.undo_depth()
    );

    io::save(simplifier.mesh(), output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}
