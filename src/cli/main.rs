//! CLI binary entry point for nlu-import

#[cfg(feature = "cli")]
mod error;

#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use error::CliError;
#[cfg(feature = "cli")]
use nlu_import_sdk::export::CsvExporter;
#[cfg(feature = "cli")]
use nlu_import_sdk::import::{
    CanonicalCsvImporter, DialogflowCxImporter, EinsteinImporter, LexImporter, NuanceMixImporter,
    RasaImporter, WatsonImporter,
};
#[cfg(feature = "cli")]
use nlu_import_sdk::models::ImportResult;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "nlu-import")]
#[command(about = "Convert third-party conversational-AI exports into the canonical intent/slot model")]
#[command(version)]
struct Cli {
    /// Source model format
    #[arg(short, long, value_enum)]
    model: ModelArg,
    /// Input payload path
    #[arg(short, long)]
    input: PathBuf,
    /// Output CSV path (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(ValueEnum, Clone, Debug)]
enum ModelArg {
    /// Dialogflow CX agent export (zip)
    DialogflowCx,
    /// Salesforce Einstein intent dataset (CSV)
    Einstein,
    /// Amazon Lex v1 bot export (zip)
    #[value(alias = "lex")]
    LexV1,
    /// Nuance Mix TRSX export (XML)
    #[value(alias = "nuance")]
    NuanceMix,
    /// Rasa 2 project export (zip) or training data document (YAML)
    #[value(alias = "rasa")]
    Rasa2,
    /// Watson Assistant workspace (JSON)
    Watson,
    /// Canonical flat CSV (headerless intent,utterance rows)
    CanonicalCsv,
}

#[cfg(feature = "cli")]
fn run(cli: Cli) -> Result<(), CliError> {
    let bytes = std::fs::read(&cli.input)
        .map_err(|err| CliError::FileReadError(cli.input.clone(), err.to_string()))?;

    let result: ImportResult = match cli.model {
        ModelArg::DialogflowCx => DialogflowCxImporter::new().import_zip(bytes)?,
        ModelArg::Einstein => {
            EinsteinImporter::new().import_csv(&String::from_utf8_lossy(&bytes))?
        }
        ModelArg::LexV1 => LexImporter::new().import_zip(bytes)?,
        ModelArg::NuanceMix => {
            NuanceMixImporter::new().import_trsx(&String::from_utf8_lossy(&bytes))?
        }
        ModelArg::Rasa2 => RasaImporter::new().import_zip(bytes)?,
        ModelArg::Watson => WatsonImporter::new().import_json(&String::from_utf8_lossy(&bytes))?,
        ModelArg::CanonicalCsv => {
            CanonicalCsvImporter::new().import_csv(&String::from_utf8_lossy(&bytes))?
        }
    };

    let exported = CsvExporter::new().export(&result)?;
    match cli.output {
        Some(path) => std::fs::write(&path, exported.content)
            .map_err(|err| CliError::FileWriteError(path.clone(), err.to_string()))?,
        None => print!("{}", exported.content),
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
