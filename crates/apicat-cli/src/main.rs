use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use apicat_core::options::OptionsIndex;
use apicat_core::project::{build_catalog, Catalog};
use apicat_core::SpecDocument;

#[derive(Parser)]
#[command(name = "apicat", about = "OpenAPI spec to operation-catalog builder", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build catalogs and option indexes for every spec in a directory
    Generate {
        /// Directory of OpenAPI spec files (YAML or JSON)
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Output directory for catalog files
        #[arg(long, default_value = "catalogs")]
        catalog_dir: PathBuf,

        /// Output directory for options-index files
        #[arg(long, default_value = "options")]
        options_dir: PathBuf,
    },

    /// Build the catalog for a single spec file
    Parse {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect the catalog summary of a spec file
    Inspect {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input_dir,
            catalog_dir,
            options_dir,
        } => cmd_generate(&input_dir, &catalog_dir, &options_dir),

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Inspect { input, format } => cmd_inspect(&input, format),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "apicat", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn load_document(path: &Path) -> Result<SpecDocument> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let doc = match ext {
        "json" => SpecDocument::from_json(&content)?,
        _ => SpecDocument::from_yaml(&content)?,
    };
    Ok(doc)
}

fn is_spec_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json" | "yaml" | "yml")
    )
}

/// Output file names derived from the spec file stem, lowercased.
fn output_names(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("catalog")
        .to_lowercase();
    (format!("{stem}.json"), format!("{stem}-options.json"))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    // Serialize before touching the file so a failure leaves nothing behind.
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn cmd_generate(input_dir: &Path, catalog_dir: &Path, options_dir: &Path) -> Result<()> {
    let mut spec_files: Vec<PathBuf> = fs::read_dir(input_dir)
        .with_context(|| format!("failed to read directory {}", input_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_spec_file(path))
        .collect();
    spec_files.sort();

    if spec_files.is_empty() {
        anyhow::bail!("no spec files found in {}", input_dir.display());
    }

    fs::create_dir_all(catalog_dir)
        .with_context(|| format!("failed to create {}", catalog_dir.display()))?;
    fs::create_dir_all(options_dir)
        .with_context(|| format!("failed to create {}", options_dir.display()))?;

    let mut generated = 0usize;
    let mut failed = 0usize;

    // One bad document never stops the batch, whether it fails to
    // build or to write.
    for path in &spec_files {
        match generate_for_file(path, catalog_dir, options_dir) {
            Ok((catalog_name, total)) => {
                eprintln!(
                    "  {} -> {} ({} operations)",
                    path.display(),
                    catalog_name,
                    total
                );
                generated += 1;
            }
            Err(err) => {
                log::error!("skipping {}: {err:#}", path.display());
                failed += 1;
            }
        }
    }

    eprintln!("Generated {generated} catalogs, {failed} failed.");
    if generated == 0 {
        anyhow::bail!("all {failed} spec files failed");
    }
    Ok(())
}

fn generate_for_file(
    path: &Path,
    catalog_dir: &Path,
    options_dir: &Path,
) -> Result<(String, usize)> {
    let doc = load_document(path)?;
    let catalog = build_catalog(&doc);
    let index = OptionsIndex::from_catalog(&catalog);

    let (catalog_name, options_name) = output_names(path);
    write_json(&catalog_dir.join(&catalog_name), &catalog)?;
    write_json(&options_dir.join(&options_name), &index)?;
    Ok((catalog_name, catalog.total_entries()))
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<()> {
    let doc = load_document(input)?;
    let catalog = build_catalog(&doc);

    match output {
        Some(path) => {
            write_json(path, &catalog)?;
            eprintln!(
                "Wrote {} ({} operations)",
                path.display(),
                catalog.total_entries()
            );
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
    }
    Ok(())
}

fn cmd_inspect(input: &Path, format: InspectFormat) -> Result<()> {
    let doc = load_document(input)?;
    let catalog = build_catalog(&doc);
    let summary = build_inspect_summary(&doc, &catalog);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn build_inspect_summary(doc: &SpecDocument, catalog: &Catalog) -> serde_json::Value {
    use apicat_core::method::HttpMethod;

    let mut per_method = serde_json::Map::new();
    for method in HttpMethod::CATALOG_ORDER {
        per_method.insert(
            method.as_str().to_string(),
            catalog.buckets.bucket(method).len().into(),
        );
    }

    serde_json::json!({
        "api": {
            "title": catalog.api_info.title,
            "base_url": catalog.api_info.base_url,
            "component": doc.component(),
            "api_type": doc.api_type(),
        },
        "operations": per_method,
        "total_entries": catalog.total_entries(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"{
        "info": {"title": "Orders"},
        "servers": [{"url": "https://host/orders.svc"}],
        "paths": {
            "/OrderSet": {"get": {"summary": "list"}},
            "/OrderSet(OrderNo='{OrderNo}')": {
                "parameters": [
                    {"name": "OrderNo", "in": "path", "required": true,
                     "schema": {"type": "string"}}
                ],
                "get": {"summary": "one"}
            }
        }
    }"#;

    #[test]
    fn load_document_handles_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("orders.json");
        fs::write(&json_path, SPEC).unwrap();
        assert_eq!(load_document(&json_path).unwrap().title(), "Orders");

        let yaml_path = dir.path().join("orders.yaml");
        fs::write(&yaml_path, "info:\n  title: Orders\npaths: {}\n").unwrap();
        assert_eq!(load_document(&yaml_path).unwrap().title(), "Orders");
    }

    #[test]
    fn output_names_are_lowercased_stems() {
        let (catalog, options) = output_names(Path::new("specs/OrderHandling.json"));
        assert_eq!(catalog, "orderhandling.json");
        assert_eq!(options, "orderhandling-options.json");
    }

    #[test]
    fn generate_writes_catalog_and_options_files() {
        let dir = tempfile::tempdir().unwrap();
        let input_dir = dir.path().join("specs");
        fs::create_dir(&input_dir).unwrap();
        fs::write(input_dir.join("OrderHandling.json"), SPEC).unwrap();
        fs::write(input_dir.join("notes.txt"), "ignored").unwrap();

        let catalog_dir = dir.path().join("catalogs");
        let options_dir = dir.path().join("options");
        cmd_generate(&input_dir, &catalog_dir, &options_dir).unwrap();

        let catalog: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(catalog_dir.join("orderhandling.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(catalog["api_info"]["title"], "Orders");
        assert_eq!(catalog["GET"].as_array().unwrap().len(), 2);

        let index: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(options_dir.join("orderhandling-options.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(index["api"], "Orders");
    }

    #[test]
    fn generate_skips_broken_documents() {
        let dir = tempfile::tempdir().unwrap();
        let input_dir = dir.path().join("specs");
        fs::create_dir(&input_dir).unwrap();
        fs::write(input_dir.join("good.json"), SPEC).unwrap();
        fs::write(input_dir.join("bad.json"), "{\"info\": {}}").unwrap();

        let catalog_dir = dir.path().join("catalogs");
        let options_dir = dir.path().join("options");
        cmd_generate(&input_dir, &catalog_dir, &options_dir).unwrap();

        assert!(catalog_dir.join("good.json").exists());
        assert!(!catalog_dir.join("bad.json").exists());
    }

    #[test]
    fn generate_survives_a_per_document_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input_dir = dir.path().join("specs");
        fs::create_dir(&input_dir).unwrap();
        fs::write(input_dir.join("blocked.json"), SPEC).unwrap();
        fs::write(input_dir.join("good.json"), SPEC).unwrap();

        // A directory squatting on the output path makes the write fail
        // for that document only.
        let catalog_dir = dir.path().join("catalogs");
        fs::create_dir_all(catalog_dir.join("blocked.json")).unwrap();
        let options_dir = dir.path().join("options");
        cmd_generate(&input_dir, &catalog_dir, &options_dir).unwrap();

        assert!(catalog_dir.join("good.json").is_file());
        assert!(!options_dir.join("blocked-options.json").exists());
    }

    #[test]
    fn generate_fails_when_nothing_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let input_dir = dir.path().join("specs");
        fs::create_dir(&input_dir).unwrap();
        fs::write(input_dir.join("bad.json"), "not json").unwrap();

        let result = cmd_generate(
            &input_dir,
            &dir.path().join("catalogs"),
            &dir.path().join("options"),
        );
        assert!(result.is_err());
    }
}
