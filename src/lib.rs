//! On-demand loading rewrite for component libraries.
//!
//! Turns an aggregate import into per-component imports at build time, so a
//! bundle only carries the sub-modules a file actually uses:
//!
//! ```text
//! import { Button } from 'antd-design-vue';   //  removed
//! console.log(Button);
//! // becomes
//! import _Button from 'antd-design-vue/lib/button';
//! import 'antd-design-vue/lib/button/style/index.js';  // with style: true
//! console.log(_Button);
//! ```
//!
//! The pass is per-file and stateless across files: collect the names bound
//! by matching aggregate imports, redirect every recognized usage site to a
//! synthesized per-component import, then drop the aggregate imports.

use swc_core::ecma::ast::Program;
use swc_core::ecma::visit::VisitMutWith;
use swc_core::plugin::{plugin_transform, proxies::TransformPluginProgramMetadata};

mod config;
mod imports;
mod scope;
mod transform;

pub use config::{ConfigError, PluginConfig, StyleMode};
pub use imports::{to_kebab_case, ImportInjector};
pub use transform::OnDemandImportTransform;

// -----------------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------------

#[plugin_transform]
pub fn process_transform(
    mut program: Program,
    metadata: TransformPluginProgramMetadata,
) -> Program {
    // A malformed configuration fails the compilation before any file is
    // visited; silently no-opping would leave aggregate imports in the
    // output with nothing to flag it.
    let raw = metadata
        .get_transform_plugin_config()
        .unwrap_or_else(|| panic!("on-demand import plugin requires a configuration object"));
    let config = PluginConfig::from_json(&raw)
        .unwrap_or_else(|err| panic!("on-demand import plugin: {err}"));

    let mut pass = OnDemandImportTransform::new(config);
    program.visit_mut_with(&mut pass);
    program
}
