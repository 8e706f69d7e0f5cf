//! Command-line surface. The CLI is a thin demonstration/debugging harness
//! over the conversion core, not a specified component in its own right.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "fhirloom", about = "Converts an HL7 v2.x message into a FHIR-shaped bundle")]
pub struct Cli {
    /// Path to the HL7 v2.x message file, or `-` to read from stdin.
    pub input: PathBuf,

    /// Primary template folder, overriding the embedded defaults.
    #[arg(long)]
    pub template_dir: Option<PathBuf>,

    /// Override template folder, layered above the primary tier.
    #[arg(long)]
    pub override_dir: Option<PathBuf>,

    /// Write the bundle to this file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Also print the coverage report, to stderr.
    #[arg(long)]
    pub coverage: bool,
}
