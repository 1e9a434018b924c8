use roff_grid_reader::{GeometryLayout, ImportOptions, RoffGridReader};
use std::env;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-roff-file> [--layout 1|2]", args[0]);
        std::process::exit(1);
    }

    let roff_path = &args[1];
    let mut layout = GeometryLayout::V1;
    // Parse --layout argument
    if let Some(layout_idx) = args.iter().position(|arg| arg == "--layout") {
        let parsed = args
            .get(layout_idx + 1)
            .and_then(|v| v.parse::<u8>().ok())
            .and_then(|v| GeometryLayout::try_from(v).ok());
        match parsed {
            Some(l) => layout = l,
            None => {
                eprintln!("ERROR: --layout flag requires 1 or 2.");
                std::process::exit(1);
            }
        }
    }

    println!("Reading ROFF file: {}", roff_path);
    println!("{}", "=".repeat(60));

    let reader = match RoffGridReader::open(roff_path) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("\nERROR: Failed to scan ROFF file");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };
    println!("Keywords: {} (byte order {:?})", reader.keywords().len(), reader.byte_order());

    match reader.import(&ImportOptions::default().with_layout(layout)) {
        Ok(grid) => {
            println!("\n{}", "=".repeat(60));
            println!("SUCCESS! Import completed.");
            println!("{}", "=".repeat(60));

            println!("\nGrid Information:");
            println!("  Dimensions: {}", grid.dimensions);
            println!("  Layout: v{}", grid.format_version());
            println!("  Shift: {:?}", grid.affine.shift);
            println!("  Scale: {:?}", grid.affine.scale);
            if let Some(creator) = &grid.info.creator {
                println!("  Creator: {}", creator);
            }
            if let Some(date) = &grid.info.creation_date {
                println!("  Created: {}", date);
            }

            println!("\nStatistics:");
            println!("  Total cells: {}", grid.dimensions.num_cells());
            println!("  Active cells: {}", grid.geometry.active_count());

            match &grid.subgrids {
                Some(subgrids) => {
                    println!("\nSubgrids:");
                    for subgrid in subgrids.iter() {
                        println!(
                            "  {}: layers {}..={}",
                            subgrid.name,
                            subgrid.layers.start(),
                            subgrid.layers.end()
                        );
                    }
                }
                None => println!("\nSubgrids: none"),
            }
        }
        Err(e) => {
            eprintln!("\nERROR: Failed to import ROFF grid");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
