//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = radnote_cli::run() {
        report(&err);
        std::process::exit(1);
    }
}

#[expect(
    clippy::print_stderr,
    reason = "Errors are reported to the terminal before exiting"
)]
fn report(err: &radnote_cli::CliError) {
    eprintln!("radnote: {err}");
}
