//! Binary entrypoint for the template language module.

use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match cg_module_template::module() {
        Ok(module) => cg_module::run(module),
        Err(error) => {
            writeln!(io::stderr().lock(), "{error}").ok();
            ExitCode::FAILURE
        }
    }
}
