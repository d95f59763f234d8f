//! crd-to-openapischema CLI binary

use crd_to_openapischema::cli::CliApp;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let matches = CliApp::app().get_matches();

    let default_filter = if matches.get_flag("verbose") {
        "crd_to_openapischema=debug,openapischema_crd=debug"
    } else {
        "crd_to_openapischema=warn,openapischema_crd=warn"
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    if let Err(err) = CliApp::run(&matches).await {
        println!("{err}");
        std::process::exit(1);
    }
}
