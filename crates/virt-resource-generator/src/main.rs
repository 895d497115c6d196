use clap::Parser;
use snafu::{ResultExt, Snafu};
use tracing::info;
use virt_components::{
    components::{self, ComponentKind, OperatorShasums},
    logging, yaml,
};

use crate::cli::Opts;

mod cli;

const APP_NAME: &str = "resource-generator";
const LOG_ENV: &str = "RESOURCE_GENERATOR_LOG";

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to initialize logging"))]
    InitializeLogging { source: logging::Error },

    #[snafu(display("failed to generate {kind} resources"))]
    GenerateResources {
        source: components::Error,
        kind: ComponentKind,
    },

    #[snafu(display("failed to write manifests"))]
    WriteManifests { source: yaml::Error },
}

#[snafu::report]
fn main() -> Result<(), Error> {
    let opts = Opts::parse();
    logging::initialize_logging(LOG_ENV, APP_NAME).context(InitializeLoggingSnafu)?;

    let kind = opts.resource_type;
    let shasums = OperatorShasums::from(&opts.shasums);
    let resources = kind
        .resources(&opts.component_config(), opts.launcher_version(), Some(&shasums))
        .context(GenerateResourcesSnafu { kind })?;
    info!(%kind, count = resources.len(), "Generated resources");

    match &opts.output {
        Some(path) => {
            yaml::write_to_file(&resources, path).context(WriteManifestsSnafu)?;
            info!(path = %path.display(), "Wrote manifests");
        }
        None => yaml::print_to_stdout(&resources).context(WriteManifestsSnafu)?,
    }

    Ok(())
}
