//! Command-line surface over the merge and mutation engines.
//!
//! Exit code 0 on success; on any unrecovered error the kind is printed to
//! stderr and the exit code is 1.

use clap::{Parser, Subcommand};
use docx_weld::{
    insert_image, merge_files, replace_image_bytes, replace_text, Document, Error, ImageFormat,
    MergeOptions, PageSetup,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "docx-weld", version, about = "Merge and edit WordprocessingML documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge source documents, in order, into a destination
    Merge {
        /// Destination path (created or overwritten atomically)
        dest: PathBuf,
        /// Source documents, merged in the order given
        #[arg(required = true)]
        sources: Vec<PathBuf>,
        /// Start the destination as a copy of this template document
        #[arg(long)]
        template: Option<PathBuf>,
        /// Do not insert section breaks between sources
        #[arg(long)]
        no_section_breaks: bool,
        /// Use landscape page setup for inserted section breaks
        #[arg(long, conflicts_with = "no_section_breaks")]
        landscape: bool,
    },
    /// Replace every occurrence of a substring in a document's text
    ReplaceText {
        path: PathBuf,
        search: String,
        replacement: String,
        /// Write the result here instead of back to PATH
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Overwrite image bytes in a document
    ReplaceImage {
        path: PathBuf,
        /// Image file providing the new bytes
        image: PathBuf,
        /// Only replace the image whose alternate text equals this tag
        /// (default: replace every image)
        #[arg(long)]
        alt: Option<String>,
        /// Write the result here instead of back to PATH
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Append an image to the end of a document's body
    InsertImage {
        path: PathBuf,
        /// Image file to embed
        image: PathBuf,
        /// Width in pixels
        #[arg(long, default_value_t = 104)]
        width: u32,
        /// Height in pixels
        #[arg(long, default_value_t = 83)]
        height: u32,
        /// Write the result here instead of back to PATH
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> docx_weld::Result<()> {
    match cli.command {
        Command::Merge {
            dest,
            sources,
            template,
            no_section_breaks,
            landscape,
        } => {
            let options = MergeOptions {
                template,
                section_break: if no_section_breaks {
                    None
                } else if landscape {
                    Some(PageSetup::landscape())
                } else {
                    Some(PageSetup::default())
                },
            };

            let report = merge_files(&dest, &sources, &options)?;
            println!(
                "merged {} document(s) into {} ({} blocks, {} images)",
                report.sources_merged,
                dest.display(),
                report.blocks_appended,
                report.images_copied
            );
            if report.unmapped_references > 0 {
                eprintln!(
                    "warning: {} relationship reference(s) could not be remapped",
                    report.unmapped_references
                );
            }
            Ok(())
        }
        Command::ReplaceText {
            path,
            search,
            replacement,
            output,
        } => {
            let mut doc = Document::open(&path, true)?;
            let count = replace_text(&mut doc, &search, &replacement);
            doc.save(output.as_deref().unwrap_or(&path))?;
            doc.close();
            println!("replaced {} occurrence(s)", count);
            Ok(())
        }
        Command::ReplaceImage {
            path,
            image,
            alt,
            output,
        } => {
            let bytes = std::fs::read(&image)?;
            let mut doc = Document::open(&path, true)?;
            let count = replace_image_bytes(&mut doc, &bytes, alt.as_deref())?;
            doc.save(output.as_deref().unwrap_or(&path))?;
            doc.close();
            println!("replaced {} image part(s)", count);
            Ok(())
        }
        Command::InsertImage {
            path,
            image,
            width,
            height,
            output,
        } => {
            let format = image_format_of(&image)?;
            let bytes = std::fs::read(&image)?;
            let mut doc = Document::open(&path, true)?;
            insert_image(&mut doc, bytes, format, width, height)?;
            doc.save(output.as_deref().unwrap_or(&path))?;
            doc.close();
            Ok(())
        }
    }
}

fn image_format_of(path: &Path) -> docx_weld::Result<ImageFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension)
        .ok_or_else(|| Error::UnsupportedImage(path.display().to_string()))
}
