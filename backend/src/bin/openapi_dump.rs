//! Print the OpenAPI document as JSON.

use std::io::{self, Write};
use std::process::ExitCode;

use nightdesk::doc::ApiDoc;
use utoipa::OpenApi;

fn main() -> ExitCode {
    let json = match ApiDoc::openapi().to_pretty_json() {
        Ok(json) => json,
        Err(error) => {
            eprintln!("failed to serialise OpenAPI document: {error}");
            return ExitCode::FAILURE;
        }
    };
    let mut stdout = io::stdout().lock();
    match writeln!(stdout, "{json}") {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("failed to write OpenAPI document: {error}");
            ExitCode::FAILURE
        }
    }
}
