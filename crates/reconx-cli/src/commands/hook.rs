//! Lifecycle hook commands
//!
//! Usage: reconx hook <pre-build|post-generate-android|post-generate-ios>
//!        --settings <PATH> --project <DIR> [--json]

use clap::{Args, Subcommand};
use reconx_core_types::RunId;
use reconx_store::hooks::{post_generate_android, post_generate_ios, pre_build};
use reconx_store::settings::parse_settings_file;
use reconx_store::{HookReport, Settings};
use std::path::{Path, PathBuf};

type HookFn = fn(&Settings, &Path, &RunId) -> HookReport;

#[derive(Debug, Args)]
pub struct HookArgs {
    #[command(subcommand)]
    pub command: HookCommand,
}

#[derive(Debug, Subcommand)]
pub enum HookCommand {
    /// Framework link list and define symbols, before the player build
    PreBuild(HookTarget),
    /// Android manifest app links, after the Gradle project is generated
    PostGenerateAndroid(HookTarget),
    /// Info.plist, entitlements and target signing, after the Xcode project is generated
    PostGenerateIos(HookTarget),
}

#[derive(Debug, Args)]
pub struct HookTarget {
    /// Settings YAML file
    #[arg(long)]
    pub settings: PathBuf,

    /// Project directory the hook operates on
    #[arg(long)]
    pub project: PathBuf,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Execute hook command
pub fn execute(args: HookArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (target, run): (HookTarget, HookFn) = match args.command {
        HookCommand::PreBuild(t) => (t, pre_build),
        HookCommand::PostGenerateAndroid(t) => (t, post_generate_android),
        HookCommand::PostGenerateIos(t) => (t, post_generate_ios),
    };

    let settings = parse_settings_file(&target.settings)?;
    let report = run(&settings, target.project.as_path(), &RunId::new());

    if target.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.summary());
    }

    if report.has_failures() {
        let failed = report.documents.iter().filter(|d| d.is_failed()).count();
        return Err(format!(
            "{} failed: {} document(s) not reconciled",
            report.hook.as_str(),
            failed
        )
        .into());
    }
    Ok(())
}
