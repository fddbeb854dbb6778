use std::process::ExitCode;

fn main() -> ExitCode {
    match ruledesk::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ruledesk::ui::output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
