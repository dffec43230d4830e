use std::process::ExitCode;

fn main() -> ExitCode {
    envtoml_cli::run()
}
