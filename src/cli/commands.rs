//! Command handler implementations
//!
//! This module contains the implementation of all CLI commands. Handlers
//! follow the same shape the workflows expose: build a plan, show it,
//! confirm, then run the apply step on a background task while this thread
//! renders progress.

use crate::cli::progress::{
    format_bytes, format_duration, print_error, print_header, print_info, print_success,
    print_warning, TaskProgress,
};
use crate::cli::{Args, Commands};
use crate::core::config::{
    get_config_path, init_config, open_config_in_editor, Config,
};
use crate::core::error::CleanupError;
use crate::duplicate::{
    actions, engine, ActionOutcome, DuplicateAction, HashAlgorithm, ScanOutcome, ScanRequest,
    ScanStage, TypeFilter,
};
use crate::naming::RenameRules;
use crate::workflow::{cleanup, renamer, sorter, spawn_task, Scope, TaskHandle};
use anyhow::{Context, Result};
use dialoguer::Confirm;
use log::{info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Run the appropriate command based on CLI arguments.
pub fn run_command(args: &Args, config: &Config, shutdown_flag: Arc<AtomicBool>) -> Result<()> {
    match &args.command {
        Commands::Rename {
            folder,
            subfolders,
            rules,
            save_rules,
            rename_files,
            remove_first,
            remove_last,
            cut_before,
            cut_after,
            remove_digits,
            remove_special,
            replace_underscores,
            title_case,
        } => {
            let mut effective = match rules {
                Some(path) => RenameRules::load_json(path)
                    .with_context(|| format!("Loading rules preset {}", path.display()))?,
                None => config.rename.rules.clone(),
            };
            if let Some(v) = remove_first {
                effective.remove_first = *v;
            }
            if let Some(v) = remove_last {
                effective.remove_last = *v;
            }
            if let Some(v) = cut_before {
                effective.cut_before = v.clone();
            }
            if let Some(v) = cut_after {
                effective.cut_after = v.clone();
            }
            if let Some(v) = remove_digits {
                effective.remove_digits = *v;
            }
            if let Some(v) = remove_special {
                effective.remove_special = *v;
            }
            if let Some(v) = replace_underscores {
                effective.replace_underscores = *v;
            }
            if let Some(v) = title_case {
                effective.title_case = *v;
            }

            if let Some(path) = save_rules {
                effective.save_json(path)?;
                print_success(&format!("Rules preset saved to {}", path.display()));
                return Ok(());
            }

            let rename_files = rename_files.unwrap_or(config.rename.rename_files);
            handle_rename(
                folder.clone(),
                scope_from(subfolders),
                effective,
                rename_files,
                args,
                shutdown_flag,
            )
        }
        Commands::Sort {
            folder,
            extension,
            separate_images,
            export_to,
            copy,
        } => {
            let options = sorter::SortOptions {
                mode: match extension {
                    Some(ext) => sorter::SortMode::Extension(ext.clone()),
                    None => sorter::SortMode::All,
                },
                separate_images: separate_images.unwrap_or(config.sorter.separate_images),
                export_to: export_to.clone(),
                operation: if *copy {
                    sorter::SortOperation::Copy
                } else {
                    sorter::SortOperation::Move
                },
            };
            handle_sort(folder.clone(), options, args, shutdown_flag)
        }
        Commands::Cleanup {
            folder,
            subfolders,
            flatten,
            remove_empty,
            remove_temp,
            remove_zero_byte,
            extensions,
        } => {
            let options = cleanup::CleanupOptions {
                flatten: flatten.unwrap_or(config.cleanup.flatten),
                remove_empty: remove_empty.unwrap_or(config.cleanup.remove_empty),
                remove_temp: remove_temp.unwrap_or(config.cleanup.remove_temp),
                remove_zero_byte_media: remove_zero_byte
                    .unwrap_or(config.cleanup.remove_zero_byte_media),
                custom_extensions: if extensions.is_empty() {
                    config.cleanup.custom_extensions.clone()
                } else {
                    extensions.clone()
                },
            };
            handle_cleanup(folder.clone(), scope_from(subfolders), options, args, shutdown_flag)
        }
        Commands::Dupes {
            folder,
            min_size_kb,
            recursive,
            all_files,
            algorithm,
            action,
        } => {
            let algorithm = match algorithm {
                Some(name) => HashAlgorithm::from_name(name)
                    .ok_or_else(|| CleanupError::InvalidInput(format!("Unknown algorithm: {}", name)))?,
                None => config.duplicates.algorithm,
            };
            let request = ScanRequest {
                root: folder.clone(),
                recursive: recursive.unwrap_or(config.duplicates.recursive),
                min_size_bytes: min_size_kb
                    .map(|kb| kb * 1024)
                    .unwrap_or_else(|| config.min_duplicate_size_bytes()),
                type_filter: if *all_files {
                    TypeFilter::All
                } else {
                    config.duplicates.type_filter
                },
                algorithm,
            };
            handle_dupes(
                request,
                action,
                config.duplicates.move_subfolder.clone(),
                args,
                shutdown_flag,
            )
        }
        Commands::Config { path, reset } => handle_config_command(*path, *reset),
        Commands::GenerateConfig { output } => generate_config_file(output.clone()),
        Commands::ShowConfig => show_config(config),
    }
}

fn scope_from(subfolders: &[String]) -> Scope {
    if subfolders.is_empty() {
        Scope::Auto
    } else {
        Scope::Selected(subfolders.to_vec())
    }
}

/// Ask before a destructive step; `--yes` answers for the user.
fn confirm(prompt: &str, args: &Args) -> Result<bool> {
    if args.yes {
        return Ok(true);
    }
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

/// Drain a task's events into the progress display, then take its result.
///
/// Cancellation is not an error at this level: the user asked for it, so
/// the handler just stops. Mutations performed before the cancellation
/// point stand, matching the per-item reporting model.
fn watch_task<T>(handle: TaskHandle<T>, message: &str) -> Result<Option<T>> {
    let mut display = TaskProgress::new(message);
    for event in handle.events().iter() {
        display.handle(&event);
    }
    match handle.join() {
        Ok(value) => {
            display.finish("");
            Ok(Some(value))
        }
        Err(CleanupError::Cancelled) => {
            display.finish_with_error("Cancelled; completed changes stand");
            Ok(None)
        }
        Err(e) => {
            display.finish_with_error(&e.to_string());
            Err(e.into())
        }
    }
}

fn print_failures(failures: &[crate::workflow::Failure]) {
    for failure in failures {
        print_error(&format!("{}: {}", failure.path.display(), failure.message));
    }
}

// ============================================================================
// Rename
// ============================================================================

fn handle_rename(
    folder: PathBuf,
    scope: Scope,
    rules: RenameRules,
    rename_files: bool,
    args: &Args,
    shutdown_flag: Arc<AtomicBool>,
) -> Result<()> {
    print_header("Bulk Folder Renamer");
    let plan = renamer::plan(&folder, &scope, &rules, rename_files)?;

    if plan.is_empty() {
        print_info("No changes would be made");
        return Ok(());
    }

    for item in plan.folders.iter().filter(|f| f.has_changes()) {
        if item.folder_changed {
            print_info(&format!("'{}' → '{}'", item.old_name, item.new_name));
        } else {
            print_info(&format!("'{}'", item.old_name));
        }
        for file in &item.file_renames {
            println!("      '{}' → '{}'", file.old_name, file.new_name);
        }
    }
    println!();
    print_info(&format!(
        "{} folder renames, {} file renames",
        plan.folder_change_count(),
        plan.file_change_count()
    ));

    if args.dry_run {
        print_info("Dry run, nothing was changed");
        return Ok(());
    }
    if !confirm("Apply these changes? This cannot be undone.", args)? {
        return Ok(());
    }

    let handle = spawn_task("rename", shutdown_flag, move |cancel, sink| {
        sink.message(format!(
            "Applying {} folder and {} file renames",
            plan.folder_change_count(),
            plan.file_change_count()
        ));
        renamer::apply(&plan, cancel)
    });
    let Some(report) = watch_task(handle, "Renaming...")? else {
        return Ok(());
    };

    print_success(&format!(
        "Renamed {} folders and {} files",
        report.folders_renamed, report.files_renamed
    ));
    print_failures(&report.failures);
    Ok(())
}

// ============================================================================
// Sort
// ============================================================================

fn handle_sort(
    folder: PathBuf,
    options: sorter::SortOptions,
    args: &Args,
    shutdown_flag: Arc<AtomicBool>,
) -> Result<()> {
    print_header("File Sorter");
    let plan = sorter::plan(&folder, &options)?;

    if plan.is_empty() {
        print_info("No files found to sort");
        return Ok(());
    }

    for category in &plan.categories {
        print_info(&format!(
            "{}/ ← {} file{}",
            category.name,
            category.files.len(),
            if category.files.len() == 1 { "" } else { "s" }
        ));
    }
    println!();
    print_info(&format!(
        "{} files into {} categories under {}",
        plan.file_count(),
        plan.categories.len(),
        plan.dest_base.display()
    ));

    if args.dry_run {
        print_info("Dry run, nothing was changed");
        return Ok(());
    }
    let verb = match plan.operation {
        sorter::SortOperation::Move => "move",
        sorter::SortOperation::Copy => "copy",
    };
    if !confirm(&format!("Sort ({}) these files?", verb), args)? {
        return Ok(());
    }

    let handle = spawn_task("sort", shutdown_flag, move |cancel, _| {
        sorter::apply(&plan, cancel)
    });
    let Some(report) = watch_task(handle, "Sorting...")? else {
        return Ok(());
    };

    print_success(&format!("Processed {} files", report.files_processed));
    print_failures(&report.failures);
    Ok(())
}

// ============================================================================
// Cleanup
// ============================================================================

fn handle_cleanup(
    folder: PathBuf,
    scope: Scope,
    options: cleanup::CleanupOptions,
    args: &Args,
    shutdown_flag: Arc<AtomicBool>,
) -> Result<()> {
    print_header("Folder Cleanup");
    let plan = cleanup::plan(&folder, &scope, &options)?;

    if plan.is_empty() {
        print_info("Nothing to clean up");
        return Ok(());
    }

    for item in &plan.flatten {
        print_info(&format!(
            "Flatten '{}' → '{}' ({} entries)",
            item.source_folder.display(),
            item.target_dir.display(),
            item.files.len() + item.folders.len()
        ));
    }
    if !plan.temp_files.is_empty() {
        print_info(&format!("Remove {} temp files", plan.temp_files.len()));
    }
    if !plan.zero_byte_media.is_empty() {
        print_info(&format!(
            "Remove {} zero-byte media files",
            plan.zero_byte_media.len()
        ));
    }
    if !plan.custom_extension_files.is_empty() {
        print_info(&format!(
            "Remove {} files by extension",
            plan.custom_extension_files.len()
        ));
    }
    if !plan.empty_folders.is_empty() {
        print_info(&format!("Remove {} empty folders", plan.empty_folders.len()));
    }

    if args.dry_run {
        print_info("Dry run, nothing was changed");
        return Ok(());
    }
    if !confirm("Apply this cleanup? This cannot be undone.", args)? {
        return Ok(());
    }

    let apply_options = options.clone();
    let handle = spawn_task("cleanup", shutdown_flag, move |cancel, _| {
        cleanup::apply(&plan, &apply_options, cancel)
    });
    let Some(report) = watch_task(handle, "Cleaning...")? else {
        return Ok(());
    };

    print_success(&format!(
        "Moved {} entries, removed {} files and {} folders",
        report.entries_moved, report.files_removed, report.folders_removed
    ));
    print_failures(&report.failures);
    Ok(())
}

// ============================================================================
// Duplicates
// ============================================================================

fn handle_dupes(
    request: ScanRequest,
    action: &str,
    move_subfolder: String,
    args: &Args,
    shutdown_flag: Arc<AtomicBool>,
) -> Result<()> {
    print_header("Duplicate File Finder");
    info!(
        "Scanning {} ({}, min size {}, {})",
        request.root.display(),
        if request.recursive {
            "recursive"
        } else {
            "top level only"
        },
        format_bytes(request.min_size_bytes),
        request.algorithm,
    );

    let root = request.root.clone();
    let scan_request = request.clone();
    let handle = spawn_task("dupes", shutdown_flag.clone(), move |cancel, sink| {
        engine::scan(&scan_request, cancel, |p| {
            let phase = match p.stage {
                ScanStage::Collect => "collecting",
                ScanStage::PartialHash => "comparing first 64 KiB",
                ScanStage::FullHash => "confirming full content",
            };
            sink.progress(phase, p.processed, p.total);
        })
    });
    let Some(outcome) = watch_task(handle, "Scanning...")? else {
        return Ok(());
    };

    print_scan_outcome(&outcome);
    if outcome.groups.is_empty() {
        return Ok(());
    }

    match action {
        "delete" => {
            let prompt = format!(
                "Delete {} duplicate files? This cannot be undone.",
                outcome.duplicate_count()
            );
            if !confirm(&prompt, args)? {
                return Ok(());
            }
            apply_duplicate_action(&outcome, &DuplicateAction::Delete, &root, &shutdown_flag)
        }
        "move" => {
            let prompt = format!(
                "Move {} duplicate files to '{}'?",
                outcome.duplicate_count(),
                move_subfolder
            );
            if !confirm(&prompt, args)? {
                return Ok(());
            }
            apply_duplicate_action(
                &outcome,
                &DuplicateAction::MoveTo(move_subfolder),
                &root,
                &shutdown_flag,
            )
        }
        _ => {
            print_info("Flag only, no files were modified");
            print_info("Rerun with --action delete or --action move to act on them");
            Ok(())
        }
    }
}

fn print_scan_outcome(outcome: &ScanOutcome) {
    if outcome.groups.is_empty() {
        print_info("No duplicates found");
    }

    for (i, group) in outcome.groups.iter().enumerate() {
        println!(
            "  Group {}: {} files of {} ({} wasted)",
            i + 1,
            group.files.len(),
            format_bytes(group.size),
            format_bytes(group.wasted_bytes())
        );
        println!("    [original]  {}", group.canonical().path.display());
        for dup in group.duplicates() {
            println!("    [duplicate] {}", dup.path.display());
        }
    }
    println!();
    print_info(&format!(
        "{} files scanned, {} duplicates in {} groups, {} reclaimable, {}",
        outcome.files_considered,
        outcome.duplicate_count(),
        outcome.groups.len(),
        format_bytes(outcome.wasted_bytes()),
        format_duration(outcome.scan_duration)
    ));

    if !outcome.skipped.is_empty() {
        print_warning(&format!(
            "{} files skipped due to I/O errors",
            outcome.skipped.len()
        ));
        for skip in &outcome.skipped {
            warn!("Skipped {}: {}", skip.path.display(), skip.reason);
        }
    }
}

fn apply_duplicate_action(
    outcome: &ScanOutcome,
    action: &DuplicateAction,
    root: &std::path::Path,
    shutdown_flag: &Arc<AtomicBool>,
) -> Result<()> {
    let outcomes = actions::apply_action(&outcome.groups, action, root, shutdown_flag)?;

    let applied = outcomes
        .iter()
        .filter(|o| o.outcome == ActionOutcome::Applied)
        .count();
    print_success(&format!("{} files processed", applied));
    for failed in &outcomes {
        if let ActionOutcome::Failed(reason) = &failed.outcome {
            print_error(&format!("{}: {}", failed.path.display(), reason));
        }
    }
    Ok(())
}

// ============================================================================
// Config commands
// ============================================================================

/// Handle the `config` command: show path, reset, or open in editor.
pub fn handle_config_command(show_path: bool, reset: bool) -> Result<()> {
    if show_path {
        let path = get_config_path().context("Could not determine config path")?;
        println!("{}", path.display());
        return Ok(());
    }

    if reset {
        let path = get_config_path().context("Could not determine config path")?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        let path = init_config()?;
        print_success(&format!("Config reset to defaults: {}", path.display()));
        return Ok(());
    }

    let path = open_config_in_editor()?;
    print_info(&format!("Opened {}", path.display()));
    Ok(())
}

/// Generate a config file at the given (or standard) location.
pub fn generate_config_file(output: Option<PathBuf>) -> Result<()> {
    let path = match output {
        Some(path) => {
            fs::write(&path, Config::generate_default_config())
                .with_context(|| format!("Writing {}", path.display()))?;
            path
        }
        None => init_config()?,
    };
    print_success(&format!("Config file written to {}", path.display()));
    Ok(())
}

/// Print the effective configuration.
pub fn show_config(config: &Config) -> Result<()> {
    print_header("Current Configuration");
    match get_config_path() {
        Some(path) if path.exists() => print_info(&format!("Loaded from {}", path.display())),
        _ => print_info("Using built-in defaults (no config file found)"),
    }
    println!();
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
