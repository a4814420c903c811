//! Read-only inspection commands

use clap::{Args, Subcommand};
use reconx_core::locate::configured_app_link_domains;
use reconx_core::model::plist::PlistDocument;
use reconx_core::model::xml_codec;
use reconx_core::reconcile::plist::partner_ids;
use reconx_core::skan::validate_partner_ids;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InspectArgs {
    #[command(subcommand)]
    pub command: InspectCommand,
}

#[derive(Debug, Subcommand)]
pub enum InspectCommand {
    /// List verified https app-link hosts configured in a manifest
    AppLinks(InspectFile),
    /// Check SKAdNetwork identifiers of an Info.plist
    Skan(InspectFile),
}

#[derive(Debug, Args)]
pub struct InspectFile {
    pub path: PathBuf,

    /// Print the result as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: InspectArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        InspectCommand::AppLinks(file) => execute_app_links(file),
        InspectCommand::Skan(file) => execute_skan(file),
    }
}

fn execute_app_links(args: InspectFile) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(&args.path)?;
    let doc = xml_codec::parse(&bytes)?;
    let domains = configured_app_link_domains(&doc);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&domains)?);
    } else if domains.is_empty() {
        println!("No app-link domains configured in {}", args.path.display());
    } else {
        for domain in domains {
            println!("{}", domain);
        }
    }
    Ok(())
}

fn execute_skan(args: InspectFile) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(&args.path)?;
    let doc = PlistDocument::parse(&bytes)?;
    let validation = validate_partner_ids(&partner_ids(&doc));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&validation)?);
    } else {
        println!("{}", validation.summary());
    }
    Ok(())
}
