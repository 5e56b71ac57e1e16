use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use vetmig_core::run_module;
use vetmig_ingest::Workbook;
use vetmig_model::{MigrationError, ModuleKind};
use vetmig_report::write_module_reports;

use crate::cli::{CreateArgs, ProcessArgs};
use crate::clients::ClientStore;
use crate::summary::print_client_table;
use crate::types::{ModuleRun, ProcessResult};

pub fn run_list(store: &ClientStore) -> Result<()> {
    let entries = store.list()?;
    if entries.is_empty() {
        println!("No clients configured under {}", store.root().display());
        return Ok(());
    }
    print_client_table(&entries);
    Ok(())
}

pub fn run_create(store: &ClientStore, args: &CreateArgs) -> Result<()> {
    let (slug, path) = store.create(&args.name, args.system.into(), &args.source)?;
    println!("Created client '{slug}'");
    println!("Configuration: {}", path.display());
    println!("Edit it to point at the export and adjust sheet and column mappings.");
    Ok(())
}

pub fn run_process(store: &ClientStore, args: &ProcessArgs) -> Result<ProcessResult> {
    let config = store.load(&args.client)?;
    if !config.active {
        return Err(MigrationError::Config(format!(
            "client '{}' is inactive; enable it in the configuration first",
            args.client
        ))
        .into());
    }
    let span = info_span!("client", client = %args.client);
    let _guard = span.enter();

    let source_path = args.source.as_ref().unwrap_or(&config.source_path);
    let workbook = Workbook::open(source_path)
        .map_err(MigrationError::from)
        .with_context(|| {
            format!(
                "opening workbook for client '{}' at {}",
                args.client,
                source_path.display()
            )
        })?;
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| store.client_dir(&args.client).join("output"));
    let modules: Vec<ModuleKind> = if args.modules.is_empty() {
        config.modules.clone()
    } else {
        args.modules.iter().map(|module| (*module).into()).collect()
    };

    let mut result = ProcessResult {
        client: args.client.clone(),
        output_dir: output_dir.clone(),
        dry_run: args.dry_run,
        modules: Vec::new(),
        errors: Vec::new(),
    };
    for module in modules {
        let mapping = config.mapping_for(module);
        match run_module(&workbook, module, &mapping, config.tie_break) {
            Ok(outcome) => {
                let reports = if args.dry_run {
                    None
                } else {
                    match write_module_reports(&output_dir, &outcome) {
                        Ok(reports) => Some(reports),
                        Err(error) => {
                            // A failed report write spoils this module
                            // only; the counts still reach the summary.
                            warn!(module = %module, "report write failed: {error:#}");
                            result.errors.push(format!("{module}: {error:#}"));
                            None
                        }
                    }
                };
                result.modules.push(ModuleRun::from_outcome(&outcome, reports));
            }
            Err(error) => {
                // One broken module must not block the others.
                warn!(module = %module, "module failed: {error:#}");
                result.errors.push(format!("{module}: {error:#}"));
            }
        }
    }
    info!(
        client = %args.client,
        modules = result.modules.len(),
        failed = result.errors.len(),
        "client processed"
    );
    Ok(result)
}
