//! # Inspect Subcommand
//!
//! Prints the resolved view of one group type: its own sections, the
//! capabilities it ends up with after inheritance, and its ancestor chain.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use tosca_core::Diagnostics;
use tosca_types::GroupType;

use crate::load_catalog;

/// Arguments for the inspect subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Definition document containing the type.
    pub file: PathBuf,

    /// Group type name. Short built-in names such as `tosca:Root` are accepted.
    pub type_name: String,

    /// Resolve against the given document only.
    #[arg(long)]
    pub no_builtins: bool,
}

/// Execute the inspect subcommand.
///
/// Returns 1 when resolving the type recorded any diagnostics.
pub fn run_inspect(args: &InspectArgs, config: Option<&Path>) -> Result<u8> {
    let catalog = load_catalog(std::slice::from_ref(&args.file), args.no_builtins, config)?;
    let mut diagnostics = Diagnostics::new();
    let group = GroupType::new(&args.type_name, &catalog, &mut diagnostics);
    print!("{}", describe(&group, &mut diagnostics));

    if diagnostics.is_empty() {
        return Ok(0);
    }
    diagnostics.sort();
    println!("diagnostics:\n{diagnostics}");
    Ok(1)
}

/// Render `group` as an indented listing. Walking the ancestors may record
/// diagnostics.
pub fn describe(group: &GroupType<'_>, diagnostics: &mut Diagnostics) -> String {
    let mut out = String::new();
    out.push_str(&format!("type:         {}\n", group.type_name()));
    if group.definition().is_none() {
        out.push_str("  (not defined)\n");
        return out;
    }
    if let Some(parent) = group.derived_from() {
        out.push_str(&format!("derived_from: {parent}\n"));
    }
    if let Some(version) = group.version() {
        out.push_str(&format!("version:      {version}\n"));
    }
    if let Some(description) = group.description() {
        out.push_str(&format!("description:  {description}\n"));
    }

    let ancestors = group.ancestors(diagnostics);
    if !ancestors.is_empty() {
        let chain: Vec<&str> = ancestors.iter().map(GroupType::type_name).collect();
        out.push_str(&format!("ancestors:    {}\n", chain.join(" -> ")));
    }

    let capabilities = group.capabilities();
    if !capabilities.is_empty() {
        out.push_str("capabilities:\n");
        for cap in capabilities {
            let resolved = cap.capability_type().unwrap_or("(no type)");
            let state = if cap.is_defined() { "" } else { " (undefined)" };
            out.push_str(&format!("  {}: {resolved}{state}\n", cap.name()));
        }
    }

    if let Some(requirements) = group.all_requirements() {
        out.push_str(&format!("requirements: {requirements}\n"));
    }
    out
}
