//! Lifecycle hooks run by the build pipeline
//!
//! - pre-build: framework link list, define symbols, symbol guards
//! - post-generate (Android): manifest app links
//! - post-generate (iOS): Info.plist partner ids and settings, entitlements,
//!   and the target build setting that points at the entitlements file
//!
//! A hook never stops at the first failing document; every document gets a
//! [`DocumentResult`] and the caller decides the exit status.

use crate::discover;
use crate::pipeline::{reconcile_to_result, DocumentResult, DocumentStatus};
use crate::rsp_symbols::ResponseFileSymbols;
use crate::settings::Settings;
use reconx_core::model::plist::PlistDocument;
use reconx_core::reconcile::plist::partner_ids;
use reconx_core::skan::{validate_partner_ids, SkanValidation};
use reconx_core::symbols::{check_symbol_guards, ensure_symbol, GuardReport, SymbolChange};
use reconx_core::{log_op_end, log_op_start, DocumentKind, ReconcileOptions, SymbolList};
use reconx_core_types::RunId;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Hook {
    PreBuild,
    PostGenerateAndroid,
    PostGenerateIos,
}

impl Hook {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hook::PreBuild => "pre_build",
            Hook::PostGenerateAndroid => "post_generate_android",
            Hook::PostGenerateIos => "post_generate_ios",
        }
    }
}

/// One define symbol made present or absent for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolResult {
    pub target: String,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<SymbolChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HookReport {
    pub hook: Hook,
    pub run_id: RunId,
    pub documents: Vec<DocumentResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<SymbolResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub guards: Vec<GuardReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skan: Option<SkanValidation>,
}

impl HookReport {
    fn new(hook: Hook, run_id: &RunId) -> Self {
        Self {
            hook,
            run_id: run_id.clone(),
            documents: Vec::new(),
            symbols: Vec::new(),
            guards: Vec::new(),
            skan: None,
        }
    }

    /// Whether any document failed fatally or a symbol could not be updated
    pub fn has_failures(&self) -> bool {
        self.documents.iter().any(DocumentResult::is_failed)
            || self.symbols.iter().any(|s| s.error.is_some())
    }

    pub fn summary(&self) -> String {
        let mut out = format!("{} (run {})\n", self.hook.as_str(), self.run_id);
        for document in &self.documents {
            out.push_str(&document.summary());
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }
        for symbol in &self.symbols {
            match (&symbol.change, &symbol.error) {
                (_, Some(error)) => out.push_str(&format!(
                    "symbol {} for {}: FAILED {}\n",
                    symbol.symbol, symbol.target, error
                )),
                (Some(change), None) => out.push_str(&format!(
                    "symbol {} for {}: {:?}\n",
                    symbol.symbol, symbol.target, change
                )),
                (None, None) => {}
            }
        }
        for guard in self.guards.iter().filter(|g| g.state.is_mismatch()) {
            out.push_str(&format!("warning: {}\n", guard.message()));
        }
        if let Some(skan) = &self.skan {
            out.push_str(&skan.summary());
            out.push('\n');
        }
        out
    }

    fn log_end(&self, start: Instant) {
        let failed = self.documents.iter().filter(|d| d.is_failed()).count();
        log_op_end!(
            self.hook.as_str(),
            duration_ms = start.elapsed().as_millis() as u64,
            run_id = self.run_id.as_str(),
            documents = self.documents.len(),
            failed = failed
        );
    }
}

fn options(run_id: &RunId) -> ReconcileOptions {
    ReconcileOptions::new(run_id.clone())
}

/// Pre-build hook with response-file symbols taken from the settings
pub fn pre_build(settings: &Settings, project_root: &Path, run_id: &RunId) -> HookReport {
    let mut symbols =
        ResponseFileSymbols::from_settings(&settings.symbols.response_files, project_root);
    pre_build_with(settings, project_root, &mut symbols, run_id)
}

/// Pre-build hook against any [`SymbolList`] backend
pub fn pre_build_with<L: SymbolList + ?Sized>(
    settings: &Settings,
    project_root: &Path,
    symbols: &mut L,
    run_id: &RunId,
) -> HookReport {
    let hook = Hook::PreBuild;
    log_op_start!(hook.as_str(), run_id = run_id.as_str());
    let start = Instant::now();
    let mut report = HookReport::new(hook, run_id);

    let path = discover::link_list_path(settings, project_root);
    report.documents.push(reconcile_to_result(
        DocumentKind::LinkList,
        &path,
        &settings.link_list_facts(),
        &options(run_id),
    ));

    let wanted = settings
        .symbols
        .define
        .iter()
        .map(|s| (s, true))
        .chain(settings.symbols.remove.iter().map(|s| (s, false)));
    let wanted: Vec<(&String, bool)> = wanted.collect();

    for target in settings.symbols.response_files.keys() {
        for (symbol, present) in &wanted {
            let result = ensure_symbol(symbols, target, symbol, *present);
            if let Err(e) = &result {
                tracing::error!(target_group = target.as_str(), symbol = symbol.as_str(), error = %e, "define symbol not updated");
            }
            report.symbols.push(SymbolResult {
                target: target.clone(),
                symbol: symbol.to_string(),
                change: result.as_ref().ok().copied(),
                error: result.err().map(|e| e.to_string()),
            });
        }

        match check_symbol_guards(&*symbols, target, &settings.symbols.guards) {
            Ok(guards) => {
                for guard in guards.iter().filter(|g| g.state.is_mismatch()) {
                    tracing::warn!(target_group = target.as_str(), "{}", guard.message());
                }
                report.guards.extend(guards);
            }
            Err(e) => {
                tracing::warn!(target_group = target.as_str(), error = %e, "symbol guards not checked");
            }
        }
    }

    report.log_end(start);
    report
}

/// Post-generate hook for the Android Gradle project
pub fn post_generate_android(
    settings: &Settings,
    android_project: &Path,
    run_id: &RunId,
) -> HookReport {
    let hook = Hook::PostGenerateAndroid;
    log_op_start!(hook.as_str(), run_id = run_id.as_str());
    let start = Instant::now();
    let mut report = HookReport::new(hook, run_id);

    let mut opts = options(run_id);
    if let Some(package) = &settings.android.package_name {
        opts = opts.with_expected_package(package.trim());
    }
    let path = discover::manifest_path(settings, android_project);
    report.documents.push(reconcile_to_result(
        DocumentKind::AndroidManifest,
        &path,
        &settings.manifest_facts(),
        &opts,
    ));

    report.log_end(start);
    report
}

/// Post-generate hook for the Xcode project
pub fn post_generate_ios(settings: &Settings, xcode_project: &Path, run_id: &RunId) -> HookReport {
    let hook = Hook::PostGenerateIos;
    log_op_start!(hook.as_str(), run_id = run_id.as_str());
    let start = Instant::now();
    let mut report = HookReport::new(hook, run_id);

    let mut info_opts = options(run_id);
    if let Some(bundle_id) = &settings.ios.bundle_id {
        info_opts = info_opts.with_expected_bundle_id(bundle_id.trim());
    }
    let info_plist = discover::info_plist_path(xcode_project);
    let info = reconcile_to_result(
        DocumentKind::InfoPlist,
        &info_plist,
        &settings.info_plist_facts(),
        &info_opts,
    );
    if matches!(info.status, DocumentStatus::Reconciled { .. }) {
        report.skan = validate_on_disk(&info_plist);
    }
    report.documents.push(info);

    let entitlements = discover::entitlements_path(settings, xcode_project);
    let entitlements_result = reconcile_to_result(
        DocumentKind::Entitlements,
        &entitlements,
        &settings.entitlements_facts(),
        &options(run_id),
    );
    let signed = entitlements_result.report().is_some();
    report.documents.push(entitlements_result);

    // The target only references an entitlements file that is on disk
    if signed {
        report.documents.push(reconcile_to_result(
            DocumentKind::LinkList,
            &discover::target_settings_path(settings, xcode_project),
            &settings.target_settings_facts(xcode_project, &entitlements),
            &options(run_id),
        ));
    }

    report.log_end(start);
    report
}

/// SKAdNetwork coverage of the Info.plist as it now stands on disk
fn validate_on_disk(path: &Path) -> Option<SkanValidation> {
    let bytes = fs::read(path).ok()?;
    let doc = PlistDocument::parse(&bytes).ok()?;
    let validation = validate_partner_ids(&partner_ids(&doc));
    if validation.is_valid() {
        tracing::info!(
            coverage_percent = validation.coverage_percent,
            "{}",
            validation.summary()
        );
    } else {
        tracing::warn!(
            missing = validation.missing_critical_ids.len(),
            "{}",
            validation.summary()
        );
    }
    Some(validation)
}
