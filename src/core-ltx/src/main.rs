use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use core_ltx::{
    ContentSnapshot, Error, FULL_FILE_NAME, GenerateOptions, Generator, INDEX_FILE_NAME, LlmsConfig, RequestInfo, Site,
    setup_logging,
};

#[derive(Parser)]
#[command(name = "core-ltx")]
#[command(about = "Generate llms.txt + llms-full.txt from a CMS content snapshot", long_about = None)]
struct CoreCli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate llms.txt and llms-full.txt for every site (or one site) of a content snapshot.
    Generate {
        /// Content snapshot (JSON) exported from the CMS.
        #[arg(short, long, value_parser = validate_input_file)]
        content: PathBuf,
        /// Generation rules (TOML).
        #[arg(long, value_parser = validate_input_file)]
        config: PathBuf,
        /// Directory receiving one `<site>/` subdirectory per generated site.
        #[arg(short, long, value_parser = validate_output_dir)]
        out_dir: PathBuf,
        /// Only generate this site.
        #[arg(short, long)]
        site: Option<String>,
        /// Host (or origin) for absolute URLs, overriding the configured domains.
        #[arg(long)]
        host: Option<String>,
    },

    /// Print the language a request would be served in.
    DetectLanguage {
        #[arg(long, value_parser = validate_input_file)]
        config: PathBuf,
        #[arg(long, default_value = "/")]
        path: String,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        accept_language: Option<String>,
    },
}

fn validate_input_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);

    if !path.exists() {
        return Err(format!("Input path does not exist: {}", path.display()));
    }

    if !path.is_file() {
        return Err(format!("Input path is not a file: {}", path.display()));
    }

    Ok(path)
}

fn validate_output_dir(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);

    if path.exists() && !path.is_dir() {
        return Err(format!("Output path is not a directory: {}", path.display()));
    }

    Ok(path)
}

fn main() {
    setup_logging("core_ltx=info");
    let cli = CoreCli::parse();

    let result = match cli.command {
        Commands::Generate {
            content,
            config,
            out_dir,
            site,
            host,
        } => generate(&content, &config, &out_dir, site.as_deref(), host),

        Commands::DetectLanguage {
            config,
            path,
            host,
            accept_language,
        } => detect_language(&config, path, host, accept_language),
    };

    if let Err(e) = result {
        eprintln!("ERROR: {e}");
        std::process::exit(1)
    }
}

fn generate(content: &Path, config: &Path, out_dir: &Path, site: Option<&str>, host: Option<String>) -> Result<(), Error> {
    let snapshot = ContentSnapshot::load(content)?;
    let generator = Generator::new(LlmsConfig::load(config)?);

    let sites: Vec<&Site> = match site {
        Some(id) => vec![snapshot.site(id).ok_or_else(|| Error::UnknownSite(id.to_string()))?],
        None => snapshot.sites.iter().collect(),
    };
    if sites.is_empty() {
        return Err(Error::NoSites);
    }

    let options = GenerateOptions {
        host_override: host,
        ..Default::default()
    };
    for site in sites {
        let docs = generator.generate(&snapshot, site, generator.languages(), &options);
        let dir = out_dir.join(&site.id);
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(INDEX_FILE_NAME), &docs.index)?;
        std::fs::write(dir.join(FULL_FILE_NAME), &docs.full)?;
        println!("{}: wrote {} and {} to {}", site.id, INDEX_FILE_NAME, FULL_FILE_NAME, dir.display());
    }
    Ok(())
}

fn detect_language(
    config: &Path,
    path: String,
    host: Option<String>,
    accept_language: Option<String>,
) -> Result<(), Error> {
    let generator = Generator::new(LlmsConfig::load(config)?);
    let request = RequestInfo {
        path,
        host,
        accept_language,
    };
    println!("{}", generator.detect_language(&request));
    Ok(())
}
