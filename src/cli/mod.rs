//! Command-line interface

use crate::config::{env_key, GeneratorConfig, DEFAULT_OUTPUT_DIR};
use crate::Generator;
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::info;

/// Main CLI application
pub struct CliApp;

impl CliApp {
    /// Create the CLI application
    pub fn app() -> Command {
        Command::new("crd-to-openapischema")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Extract the OpenAPI v3 schemas embedded in a CustomResourceDefinition into JSON files")
            .arg(
                Arg::new("crd")
                    .help("Path or URL of the CustomResourceDefinition manifest")
                    .value_name("CRD")
                    .required(true),
            )
            .arg(
                Arg::new("output-dir")
                    .long("output-dir")
                    .help("directory to save the schemas in")
                    .value_name("DIR")
                    .env(env_key("output-dir"))
                    .default_value(DEFAULT_OUTPUT_DIR),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Log every step, including the files written")
                    .action(ArgAction::SetTrue),
            )
    }

    /// Build the generator configuration from parsed arguments
    pub fn config(matches: &ArgMatches) -> GeneratorConfig {
        let output_dir = matches
            .get_one::<String>("output-dir")
            .map(String::as_str)
            .unwrap_or(DEFAULT_OUTPUT_DIR);

        GeneratorConfig::new(output_dir)
    }

    /// Run the CLI application
    pub async fn run(matches: &ArgMatches) -> Result<()> {
        let crd = matches
            .get_one::<String>("crd")
            .ok_or_else(|| anyhow::anyhow!("missing CRD path or URL"))?;

        let generator = Generator::new(Self::config(matches));
        let files = generator.generate(crd).await?;

        for file in &files {
            info!("Wrote {}", file.display());
        }

        Ok(())
    }
}
