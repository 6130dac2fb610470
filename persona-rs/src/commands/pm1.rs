//! PM1 event container command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use atlus_pm1::{Injection, MESSAGE_SCRIPT_KIND, SectionTable};

use crate::transform::{GameVariant, codec_for};

#[derive(Subcommand)]
pub enum Pm1Commands {
    /// Extract the message script from a PM1 container
    Extract {
        /// Path to the PM1 container
        file: PathBuf,

        /// Path for the extracted script (defaults to the container path
        /// with a .msg extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Game variant, forwarded to the message-script codec
        #[arg(long, value_enum)]
        game: Option<GameVariant>,
    },

    /// Compile a script and inject it into its PM1 container
    Inject {
        /// Path to the .msg script file
        file: PathBuf,

        /// Path to the PM1 container to patch (defaults to the script path
        /// with a .pm1 extension)
        #[arg(short, long)]
        container: Option<PathBuf>,

        /// Write the patched container here instead of patching in place
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Game variant, forwarded to the message-script codec
        #[arg(long, value_enum)]
        game: Option<GameVariant>,
    },

    /// Display the section table of a PM1 container
    Info {
        /// Path to the PM1 container
        file: PathBuf,
    },
}

pub fn execute(command: Pm1Commands) -> Result<()> {
    match command {
        Pm1Commands::Extract { file, output, game } => execute_extract(file, output, game),
        Pm1Commands::Inject {
            file,
            container,
            output,
            game,
        } => execute_inject(file, container, output, game),
        Pm1Commands::Info { file } => execute_info(file),
    }
}

fn execute_extract(
    path: PathBuf,
    output: Option<PathBuf>,
    game: Option<GameVariant>,
) -> Result<()> {
    let script = atlus_pm1::extract_section(&path, MESSAGE_SCRIPT_KIND)
        .with_context(|| format!("Failed to read PM1 container: {}", path.display()))?;

    let Some(script) = script else {
        println!("No message script present in {}", path.display());
        return Ok(());
    };

    let codec = codec_for(game);
    let text = codec
        .decompile(&script)
        .context("Failed to decompile message script")?;

    let output = output.unwrap_or_else(|| path.with_extension("msg"));
    fs::write(&output, text)
        .with_context(|| format!("Failed to write script file: {}", output.display()))?;

    println!(
        "Extracted {} byte message script to {}",
        script.len(),
        output.display()
    );
    Ok(())
}

fn execute_inject(
    path: PathBuf,
    container: Option<PathBuf>,
    output: Option<PathBuf>,
    game: Option<GameVariant>,
) -> Result<()> {
    let container = container.unwrap_or_else(|| path.with_extension("pm1"));
    if !container.exists() {
        anyhow::bail!("{} doesn't exist", container.display());
    }

    let source = fs::read(&path)
        .with_context(|| format!("Failed to read script file: {}", path.display()))?;

    // Compile strictly before the write pass; a codec failure leaves the
    // container untouched.
    let codec = codec_for(game);
    let data = codec
        .compile(&source)
        .context("Message script failed to compile")?;

    let out_path = output.unwrap_or_else(|| container.clone());
    let outcome = atlus_pm1::inject_section_to(&container, &out_path, MESSAGE_SCRIPT_KIND, &data)
        .with_context(|| format!("Failed to patch PM1 container: {}", container.display()))?;

    match outcome {
        Injection::InPlace { offset, len } => {
            println!(
                "{} was patched in place: {len} bytes at offset {offset}",
                out_path.display()
            );
        }
        Injection::Relocated {
            old_offset,
            new_offset,
            len,
        } => {
            println!(
                "{} was patched: {len} bytes relocated from offset {old_offset} to {new_offset}",
                out_path.display()
            );
        }
    }
    Ok(())
}

fn execute_info(path: PathBuf) -> Result<()> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let table = SectionTable::read(&mut reader)
        .with_context(|| format!("Failed to parse PM1 container: {}", path.display()))?;

    println!("PM1 container: {}", path.display());
    println!("Sections: {}", table.len());
    println!("{:>6} {:>10} {:>7} {:>10}", "type", "size", "count", "offset");
    for (entry, _) in table.entries() {
        println!(
            "{:>6} {:>10} {:>7} {:>10}",
            entry.kind, entry.size, entry.count, entry.offset
        );
    }
    Ok(())
}
