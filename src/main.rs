use clap::Parser;
use nemofi::archive::{ExtractOptions, NmoArchive};
use nemofi::variant::{ContainerVariant, DecodedContainer, TableContents};
use nemofi::strict::StrictContents;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nmo-unpack", about = "Virtools (Nemo Fi) extractor")]
struct Cli {
    /// Input container (.nmo / .cmo / .vmo)
    input: PathBuf,
    /// List only: print entries, write nothing
    #[arg(short = 'l', long = "list")]
    list_only: bool,
    /// Output root directory
    #[arg(short, long, default_value = "Dump")]
    output: PathBuf,
    /// Print the listing as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    println!("\nVirtools (Nemo Fi) extractor\n");

    if !cli.input.is_file() {
        println!("Error: file does not exist.");
        return;
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let opts = ExtractOptions {
        output_root: cli.output,
        list_only:   cli.list_only,
    };

    let mut ar = NmoArchive::open(&cli.input)?;
    print_summary(&ar);

    let decoded = ar.decode()?;
    if cli.json {
        print_json(&decoded)?;
    } else {
        match &decoded {
            DecodedContainer::Strict(c) => print_slices(c),
            DecodedContainer::Table(t)  => print_entries(t),
        }
    }

    let report = ar.write_outputs(&decoded, &opts)?;
    let count = match &decoded {
        DecodedContainer::Strict(c) => c.slices.len(),
        DecodedContainer::Table(t)  => t.entries.len(),
    };
    if opts.list_only {
        println!("\nDone. Listed {count} entries.");
    } else {
        let dir = report.output_dir.unwrap_or(opts.output_root);
        println!("\nDone. Extracted {} files to: {}", report.written.len(), dir.display());
        if let Some(m) = report.manifest {
            println!("Manifest: {}", m.display());
        }
    }
    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn print_summary(ar: &NmoArchive) {
    println!("- file:             {}", ar.path().display());
    println!("- variant:          {}", ar.variant().name());
    match ar.variant() {
        ContainerVariant::StrictRecord { header: h, location: loc }
        | ContainerVariant::LegacyTrailingTable { header: h, location: loc } => {
            if loc.is_shifted() {
                println!("- header offset:    0x{:X} (recovered)", loc.offset);
            }
            println!("- layout:           {}", h.layout.name());
            println!("- date:             {}", h.date);
            println!("- compcsz:          0x{:08X}  componentsSize: 0x{:08X}",
                     h.components_packed_size, h.components_size);
            println!("- objcsz:           0x{:08X}  objsz:          0x{:08X}",
                     h.objects_packed_size, h.objects_size);
            println!("- componentsCount:  {}", h.components_count);
            println!("- objectsCount:     {}", h.objects_count);
            println!("- version:          {}", h.version);
        }
        ContainerVariant::Vxbg { sub_header_offset } => {
            println!("- VXBG sub-header:  0x{sub_header_offset:X}");
        }
    }
}

fn print_slices(c: &StrictContents) {
    println!("\n  idx  start      size       type                 id        name");
    println!("  -------------------------------------------------------------------------");
    for s in &c.slices {
        println!("  {:>3}  0x{:08X}  0x{:08X}  {:<20}  {:>8}  {}",
                 s.index, s.start, s.size, s.type_name(), s.id, s.name);
    }
}

fn print_entries(t: &TableContents) {
    println!("\n  {:<40} {:>12} {:>12}", "Name", "Offset", "Size");
    for e in &t.entries {
        println!("  {:<40} {:>12} {:>12}", e.name, e.offset, e.size);
    }
    if let Some(end) = t.walk_end {
        println!("  (table ended: {end:?})");
    }
}

fn print_json(decoded: &DecodedContainer) -> serde_json::Result<()> {
    let text = match decoded {
        DecodedContainer::Strict(c) => serde_json::to_string_pretty(&c.slices)?,
        DecodedContainer::Table(t)  => serde_json::to_string_pretty(t)?,
    };
    println!("{text}");
    Ok(())
}
