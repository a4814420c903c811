//! Reconcile a single document from the settings
//!
//! Usage: reconx reconcile <KIND> <PATH> --settings <PATH> [--json]

use clap::{Args, ValueEnum};
use reconx_core::{DocumentKind, ReconcileOptions};
use reconx_core_types::RunId;
use reconx_store::reconcile_file;
use reconx_store::settings::parse_settings_file;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    AndroidManifest,
    Entitlements,
    InfoPlist,
    LinkList,
}

impl From<KindArg> for DocumentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::AndroidManifest => DocumentKind::AndroidManifest,
            KindArg::Entitlements => DocumentKind::Entitlements,
            KindArg::InfoPlist => DocumentKind::InfoPlist,
            KindArg::LinkList => DocumentKind::LinkList,
        }
    }
}

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Document kind
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Document to reconcile in place
    pub path: PathBuf,

    /// Settings YAML file the facts come from
    #[arg(long)]
    pub settings: PathBuf,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: ReconcileArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = parse_settings_file(&args.settings)?;
    let kind = DocumentKind::from(args.kind);

    let mut options = ReconcileOptions::new(RunId::new());
    if let (DocumentKind::AndroidManifest, Some(package)) = (kind, &settings.android.package_name) {
        options = options.with_expected_package(package.trim());
    }
    if let (DocumentKind::InfoPlist, Some(bundle_id)) = (kind, &settings.ios.bundle_id) {
        options = options.with_expected_bundle_id(bundle_id.trim());
    }

    let report = reconcile_file(kind, &args.path, &settings.facts_for(kind), &options)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.summary());
    }
    Ok(())
}
