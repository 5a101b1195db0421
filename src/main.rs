use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ccda_core::config::{
    document_id_root_from_env_value, language_code_from_env_value, version_from_env_value,
};
use ccda_core::constants::{
    DEFAULT_CONFIDENTIALITY_CODE, ENV_DOCUMENT_ID_ROOT, ENV_LANGUAGE_CODE, ENV_VERSION,
};
use ccda_core::{
    AssemblyConfig, DocumentAssembler, DocumentVariant, EncounterFile, SectionKind,
    SerializeOptions, TemplateKind, TemplateRegistry, Version,
};

#[derive(Parser)]
#[command(name = "ccda")]
#[command(about = "Assemble C-CDA clinical documents from encounter records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble an encounter file into a clinical document
    Assemble(AssembleArgs),
    /// Print the template ids resolved for a document variant
    Templates {
        /// Document variant (generic, ccd, discharge_summary, progress_note)
        #[arg(long)]
        variant: DocumentVariant,
        /// C-CDA release (defaults to CCDA_VERSION, then the latest release)
        #[arg(long)]
        version: Option<Version>,
    },
}

#[derive(Args)]
struct AssembleArgs {
    /// Encounter file (YAML)
    file: PathBuf,
    /// Document variant, overriding the one in the file
    #[arg(long)]
    variant: Option<DocumentVariant>,
    /// C-CDA release, overriding the file and CCDA_VERSION
    #[arg(long)]
    version: Option<Version>,
    /// Write the document here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Skip indentation
    #[arg(long)]
    compact: bool,
    /// Omit the XML declaration
    #[arg(long)]
    no_declaration: bool,
}

/// Main entry point for the ccda CLI
///
/// # Environment Variables
/// - `CCDA_VERSION`: default C-CDA release (default: latest)
/// - `CCDA_DOCUMENT_ID_ROOT`: OID used for generated document ids
/// - `CCDA_LANGUAGE_CODE`: document language (default: "en-US")
/// - `RUST_LOG`: log filter (default directive: "ccda=info")
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("ccda=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let env = EnvSettings::from_env()?;

    match cli.command {
        Commands::Assemble(args) => {
            let xml = assemble_file(&args, &env)?;
            match &args.output {
                Some(path) => {
                    std::fs::write(path, &xml)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    tracing::info!(path = %path.display(), "document written");
                }
                None => println!("{xml}"),
            }
        }
        Commands::Templates { variant, version } => {
            let version = version.unwrap_or(env.version);
            for line in template_lines(TemplateRegistry::shared(), variant, version)? {
                println!("{line}");
            }
        }
    }

    Ok(())
}

/// Settings read once from the environment.
struct EnvSettings {
    version: Version,
    config: AssemblyConfig,
}

impl EnvSettings {
    fn from_env() -> anyhow::Result<Self> {
        Self::from_values(
            std::env::var(ENV_VERSION).ok(),
            std::env::var(ENV_DOCUMENT_ID_ROOT).ok(),
            std::env::var(ENV_LANGUAGE_CODE).ok(),
        )
    }

    fn from_values(
        version: Option<String>,
        document_id_root: Option<String>,
        language_code: Option<String>,
    ) -> anyhow::Result<Self> {
        let version = version_from_env_value(version)
            .with_context(|| format!("invalid {ENV_VERSION}"))?;
        let root = document_id_root_from_env_value(document_id_root)?;
        let config = AssemblyConfig::new(
            version,
            language_code_from_env_value(language_code),
            DEFAULT_CONFIDENTIALITY_CODE.to_string(),
            root,
        )?;
        Ok(Self { version, config })
    }
}

/// Read, assemble and serialize one encounter file.
///
/// Precedence for variant and version: command line, then the file, then the environment.
fn assemble_file(args: &AssembleArgs, env: &EnvSettings) -> anyhow::Result<String> {
    let text = read_encounter(&args.file)?;
    let encounter = EncounterFile::parse(&text)
        .with_context(|| format!("invalid encounter file {}", args.file.display()))?;

    let variant = args
        .variant
        .or(encounter.variant)
        .unwrap_or(DocumentVariant::Generic);
    let version = args.version.or(encounter.version).unwrap_or(env.version);
    let config = env.config.with_version(version);

    let header = encounter.header(
        || config.generate_document_id(),
        || chrono::Local::now().fixed_offset(),
    );
    let sections = encounter.builders();
    tracing::debug!(%variant, %version, sections = sections.len(), "assembling encounter");

    let assembler = DocumentAssembler::new(TemplateRegistry::shared(), variant, config);
    let document = assembler.assemble(&header, &sections)?;
    let xml = document.serialize_with(SerializeOptions {
        pretty: !args.compact,
        declaration: !args.no_declaration,
    })?;
    Ok(xml)
}

fn read_encounter(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Document templates followed by each section's, for sections registered in `version`.
fn template_lines(
    registry: &TemplateRegistry,
    variant: DocumentVariant,
    version: Version,
) -> anyhow::Result<Vec<String>> {
    let mut lines = vec![format!("{variant} {version}")];
    for template in registry.resolve(TemplateKind::Document(variant), version)? {
        lines.push(format!("  {template}"));
    }
    for kind in SectionKind::ALL {
        let kind = TemplateKind::Section(kind);
        if !registry.is_registered(kind, version) {
            continue;
        }
        lines.push(format!("{kind}"));
        for template in registry.resolve(kind, version)? {
            lines.push(format!("  {template}"));
        }
    }
    Ok(lines)
}
