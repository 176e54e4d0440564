//! Build automation tasks for ABB
//!
//! Usage:
//!   cargo xtask pack-content    # Zip assets/content_package into assets/content_package.zip
//!   cargo xtask list-content    # Print the entries of a content package

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Directory every package entry is stored under
const ARCHIVE_ROOT: &str = "content_package";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for ABB")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the content package from a directory of resources
    PackContent {
        /// Directory to pack (default: assets/content_package)
        #[arg(long)]
        source: Option<PathBuf>,
        /// Package to write (default: assets/content_package.zip)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the entries of a content package
    ListContent {
        /// Package to read (default: assets/content_package.zip)
        #[arg(long)]
        package: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::PackContent { source, output } => pack_content(source, output),
        Commands::ListContent { package } => list_content(package),
    }
}

/// Get the project root directory
fn project_root() -> Result<PathBuf> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .context("xtask has no parent directory")
}

fn default_package(root: &Path) -> PathBuf {
    root.join("assets/content_package.zip")
}

/// Add a directory's files to the package recursively, in sorted order
fn zip_dir_recursive<W: io::Write + io::Seek>(
    writer: &mut ZipWriter<W>,
    src: &Path,
    prefix: &str,
    options: SimpleFileOptions,
) -> Result<usize> {
    writer.add_directory(format!("{}/", prefix), options)?;

    let mut entries = std::fs::read_dir(src)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut count = 0;
    for entry in entries {
        let src_path = entry.path();
        let name = format!("{}/{}", prefix, entry.file_name().to_string_lossy());

        if src_path.is_dir() {
            count += zip_dir_recursive(writer, &src_path, &name, options)?;
        } else {
            writer.start_file(name.as_str(), options)?;
            let mut file = File::open(&src_path)
                .with_context(|| format!("Failed to open {}", src_path.display()))?;
            io::copy(&mut file, writer)?;
            println!("  {}", name);
            count += 1;
        }
    }
    Ok(count)
}

/// Zip a resource directory into a content package
fn pack_content(source: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let root = project_root()?;
    let source = source.unwrap_or_else(|| root.join("assets").join(ARCHIVE_ROOT));
    let output = output.unwrap_or_else(|| default_package(&root));

    if !source.is_dir() {
        anyhow::bail!("Content source {} is not a directory", source.display());
    }
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    println!("Packing {}...", source.display());
    let file = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let count = zip_dir_recursive(&mut writer, &source, ARCHIVE_ROOT, options)?;
    writer.finish()?;

    println!("Content package ready: {} ({} files)", output.display(), count);
    Ok(())
}

/// Print every entry name with its uncompressed size
fn list_content(package: Option<PathBuf>) -> Result<()> {
    let root = project_root()?;
    let package = package.unwrap_or_else(|| default_package(&root));

    let file = File::open(&package)
        .with_context(|| format!("Failed to open {}", package.display()))?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .with_context(|| format!("{} is not a zip archive", package.display()))?;

    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.is_dir() {
            println!("{:>10}  {}", "-", entry.name());
        } else {
            println!("{:>10}  {}", entry.size(), entry.name());
        }
    }
    Ok(())
}
