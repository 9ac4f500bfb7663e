use clap::Parser;
use monobank_functions::app::{self, Cli};
use monobank_functions::{log_debug, log_error};

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };
    if let Err(e) = app::run(cli).await {
        log_error!("{}", e);
        log_debug!("{:?}", e);
        std::process::exit(1);
    }
}
