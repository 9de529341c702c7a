#![warn(clippy::unwrap_used)]

use clap::Parser;
use guidepress::{
    assembler::generate_guide,
    configuration::GeneratorConfiguration,
    error::ContextError,
    guide::{Guide, GuideKind, Language},
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, long_about = None)]
struct CliArguments {
    #[arg(short = 'c', long = "configuration", value_name = "json_file")]
    configuration_path: Option<PathBuf>,
    /// Overrides the output directory of the configuration.
    #[arg(short = 'o', long = "output-directory", value_name = "directory")]
    output_directory: Option<PathBuf>,
    /// The guides to generate, all of them when omitted.
    #[arg(short = 'g', long = "guide", value_enum)]
    guides: Vec<GuideKind>,
    /// The languages to generate, all of them when omitted.
    #[arg(short = 'l', long = "language", value_enum)]
    languages: Vec<Language>,
    /// Renders a guide document from a file instead of the built-in guides.
    #[arg(short = 'd', long = "document", value_name = "json_file", conflicts_with_all = ["guides", "languages"])]
    document_path: Option<PathBuf>,
    /// Logs more details, once for the layout decisions and twice for everything.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbosity: u8,
}

fn main() {
    if let Err(error) = fallible_main() {
        log::error!("{}", error);
        std::process::exit(1);
    }
}

fn fallible_main() -> Result<(), ContextError> {
    let arguments = CliArguments::parse();
    env_logger::builder()
        .filter_level(match arguments.verbosity {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .parse_default_env()
        .init();
    log::debug!("{:?}", arguments);

    let mut configuration = match &arguments.configuration_path {
        Some(configuration_path) => GeneratorConfiguration::from_path(configuration_path)?,
        None => GeneratorConfiguration::default(),
    };
    if let Some(output_directory) = arguments.output_directory {
        configuration.output_directory = output_directory;
    }

    let guides = match &arguments.document_path {
        Some(document_path) => vec![Guide::from_path(document_path)?],
        None => selected_guides(&arguments.guides, &arguments.languages)?,
    };
    for guide in &guides {
        let pdf_path = generate_guide(guide, &configuration)?;
        println!("PDF generated: {}", pdf_path.display());
    }

    Ok(())
}

fn selected_guides(kinds: &[GuideKind], languages: &[Language]) -> Result<Vec<Guide>, ContextError> {
    let kinds = if kinds.is_empty() { &GuideKind::ALL[..] } else { kinds };
    let languages = if languages.is_empty() {
        &Language::ALL[..]
    } else {
        languages
    };

    let mut guides = Vec::new();
    for kind in kinds {
        for language in languages {
            guides.push(Guide::embedded(*kind, *language)?);
        }
    }
    Ok(guides)
}
