use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use lapse_core::io::image_size;

use crate::inputs::collect_inputs;

#[derive(Args)]
pub struct InfoArgs {
    /// Input images, or directories of images
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Order frames by modification time instead of file name
    #[arg(long)]
    pub sort_by_time: bool,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let paths = collect_inputs(&args.inputs, args.sort_by_time)?;
    let mut sizes = Vec::new();

    for (i, path) in paths.iter().enumerate() {
        match image_size(path) {
            Ok(size) => {
                println!("{:>5}  {:<11}  {}", i, size.to_string(), path.display());
                sizes.push(size);
            }
            Err(e) => println!("{:>5}  {:<11}  {} ({})", i, "unreadable", path.display(), e),
        }
    }

    println!();
    println!("Frames:      {}", paths.len());
    if let Some(reference) = sizes.first() {
        println!("Reference:   {}", reference);
        let mixed = sizes.iter().filter(|s| *s != reference).count();
        if mixed > 0 {
            println!("Other sizes: {} frames", mixed);
        }
    }

    Ok(())
}
