use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use custom_mesh::model::{self, ParseOptions};

#[derive(Parser)]
#[command(author, version, about = "Inspect a .model mesh file", long_about = None)]
struct Args {
    /// Mesh file to inspect
    path: PathBuf,

    /// Fail if groups leave faces uncovered or overlap
    #[arg(long)]
    strict_coverage: bool,

    /// List every group with its index range
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = ParseOptions {
        require_full_coverage: args.strict_coverage,
    };
    let mesh = model::load(&args.path, options)
        .with_context(|| format!("Failed to load {}", args.path.display()))?;

    println!("{}", args.path.display());
    println!("  vertices: {}", mesh.vertices().len());
    println!("  faces:    {}", mesh.faces().len());
    println!("  groups:   {}", mesh.submeshes().len());

    if let Some((min, max)) = mesh.bounds() {
        println!("  bounds:   {:?} .. {:?}", min.to_array(), max.to_array());
    }

    if let Err(e) = mesh.check_coverage() {
        log::warn!("{}", e);
    }

    if args.verbose {
        for group in mesh.submeshes() {
            println!(
                "    {:>6}..{:<6} {} (indices {}+{})",
                group.start_face,
                group.end_face,
                group.name,
                group.start_index(),
                group.index_count()
            );
        }
    }

    Ok(())
}
