//! Crate-level integration and BDD tests.

use std::ffi::OsString;

use crate::capability::{Capabilities, ModuleDescriptor};
use crate::context::ModuleContext;
use crate::dispatch::{Module, Outcome};
use crate::protocol::{Action, ProjectType};
use crate::version::Version;


fn server_only_descriptor() -> ModuleDescriptor {
    let capabilities = Capabilities::builder()
        .server([Version::new(1, 0, 0), Version::new(2, 0, 0)])
        .build()
        .expect("capabilities");
    ModuleDescriptor::new("bdd", "BDD", Version::new(0, 1, 0), capabilities).expect("descriptor")
}

#[test]
fn info_only_module_end_to_end() {
    let mut module = Module::new(server_only_descriptor());
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let outcome = module.dispatch(
        ["cgmod-bdd", "info"].map(OsString::from),
        &ModuleContext::default(),
        &mut stdout,
        &mut stderr,
    );

    assert_eq!(outcome, Outcome::Success);
    assert!(stderr.is_empty());
    let info: crate::protocol::ModuleInfo =
        serde_json::from_slice(&stdout).expect("info document");
    assert_eq!(info.actions(), &[Action::Info]);
    assert_eq!(info.project_types(), &[ProjectType::Server]);
    assert_eq!(info.protocol_version(), crate::protocol::PROTOCOL_VERSION);
}
