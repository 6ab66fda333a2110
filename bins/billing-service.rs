use std::process::ExitCode;

use server::ServiceKind;

fn main() -> ExitCode {
    server::bootstrap::main_for(ServiceKind::Billing)
}
