//! Command-line front end: list the catalog, generate a cahier des charges,
//! inspect a generated PDF.

use cahier_des_charges::{Catalog, Generator, PdfInspector, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cahier-des-charges", version, about = "📄 Cahier des charges PDF generator with embedded Excel templates")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the use cases of the catalog
    List {
        /// Catalog file to use instead of the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Generate a PDF for the selected use cases
    Generate {
        /// Use case ids, e.g. UC001 UC003
        ids: Vec<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Catalog file to use instead of the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Generation timestamp (YYYY-MM-DDTHH:MM:SS), defaults to now
        #[arg(long, value_parser = parse_timestamp)]
        at: Option<NaiveDateTime>,
    },

    /// Show the pages and attachments of a generated PDF
    Inspect {
        pdf: PathBuf,

        /// Extract every attachment into this directory
        #[arg(long)]
        extract: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::List { catalog } => run_list(catalog.as_deref()),
        Command::Generate {
            ids,
            output,
            catalog,
            at,
        } => {
            if ids.is_empty() {
                eprintln!("❌ Veuillez sélectionner au moins un use case (ex: UC001).");
                process::exit(1);
            }
            let at = at.unwrap_or_else(|| chrono::Local::now().naive_local());
            run_generate(&ids, &output, catalog.as_deref(), at)
        }
        Command::Inspect { pdf, extract } => run_inspect(&pdf, extract.as_deref()),
    };

    if let Err(e) = outcome {
        eprintln!("\n❌ Error: {e}");
        process::exit(1);
    }
}

fn parse_timestamp(s: &str) -> std::result::Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map_err(|e| format!("expected YYYY-MM-DDTHH:MM:SS: {e}"))
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => Catalog::from_path(path),
        None => Catalog::builtin(),
    }
}

fn run_list(catalog: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(catalog)?;

    println!("📚 {} use cases", catalog.len());
    println!("{}", "─".repeat(60));
    for uc in catalog.iter() {
        println!("  {}  {}", uc.id, uc.title);
        println!("         📎 {} ({} champs)", uc.attachment_filename, uc.fields.len());
    }
    Ok(())
}

fn run_generate(ids: &[String], output: &Path, catalog: Option<&Path>, at: NaiveDateTime) -> Result<()> {
    let catalog = load_catalog(catalog)?;
    let generator = Generator::new(&catalog);

    let document = generator.generate_ids(ids, at)?;
    let path = document.save_to_dir(output)?;

    println!("✅ PDF généré : {}", path.display());
    println!("   {} bytes, {} pièce(s) jointe(s)", document.data.len(), document.attachments.len());
    for name in &document.attachments {
        println!("   📎 {name}");
    }
    Ok(())
}

fn run_inspect(pdf: &Path, extract: Option<&Path>) -> Result<()> {
    println!("🔍 Analyzing PDF: {}", pdf.display());
    println!("{}", "─".repeat(60));

    let inspector = PdfInspector::from_path(pdf)?;
    inspector.is_pdf()?;
    println!("📋 Pages: {}", inspector.page_count());

    if !inspector.has_embedded_files() {
        println!("📎 No embedded files");
        return Ok(());
    }

    let files = inspector.extract_embedded_files()?;
    println!("📎 Embedded files: {}", files.len());
    for file in &files {
        println!("   • {} ({} bytes)", file.filename, file.data.len());
        if let Some(description) = &file.metadata.description {
            println!("     {description}");
        }
    }

    if let Some(dir) = extract {
        for file in &files {
            file.save_to_disk(dir)?;
        }
        println!("💾 Extracted {} file(s) to {}", files.len(), dir.display());
    }
    Ok(())
}
