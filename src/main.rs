use clap::Parser;
use nestegg::api::{ApiError, Cli, Command, run_http_server, run_projection_command};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Serve { port } => run_http_server(port).await.map_err(ApiError::from),
        Command::Project(args) => run_projection_command(&args).map(|report| {
            println!("{}", report.trim_end());
        }),
    };

    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}
