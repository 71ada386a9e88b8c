//! One handler per subcommand. Handlers call the API, render and print.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use shelfapp::api::ShelfApi;
use shelfapp::commands::export::{ExportFormat, ExportOptions};
use shelfapp::commands::import::ConflictResolution;
use shelfapp::commands::rules::{ConditionDraft, RuleDraft};
use shelfapp::commands::template::{TemplateImportOptions, TemplateOptions};
use shelfapp::commands::CmdMessage;
use shelfapp::model::CategoryDraft;
use shelfapp::store::StorageBackend;

use super::render;
use super::setup::{CategoryCommands, RuleCommands, TemplateCommands};

fn name_of<B: StorageBackend>(api: &ShelfApi<B>) -> impl Fn(&str) -> String + '_ {
    move |id: &str| {
        api.get_category(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|_| id.to_string())
    }
}

fn emit(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            print!(
                "{}",
                render::render_messages(&[CmdMessage::success(format!(
                    "Wrote {}",
                    path.display()
                ))])
            );
        }
        None => println!("{}", content),
    }
    Ok(())
}

pub fn category<B: StorageBackend>(api: &mut ShelfApi<B>, action: CategoryCommands) -> Result<()> {
    match action {
        CategoryCommands::Add {
            name,
            parent,
            color,
            icon,
            tags,
            description,
        } => {
            let mut draft = CategoryDraft::new(name).with_tags(tags);
            if let Some(parent) = parent {
                draft = draft.with_parent(parent);
            }
            if let Some(color) = color {
                draft = draft.with_color(color);
            }
            if let Some(icon) = icon {
                draft = draft.with_icon(icon);
            }
            if let Some(description) = description {
                draft = draft.with_description(description);
            }
            let cat = api.create_category(draft)?;
            print!(
                "{}",
                render::render_messages(&[CmdMessage::success(format!(
                    "Created {} ({})",
                    cat.name, cat.id
                ))])
            );
        }
        CategoryCommands::Move { id, parent } => {
            let cat = api.move_category(&id, parent.as_deref())?;
            let target = parent
                .as_deref()
                .map(name_of(api))
                .unwrap_or_else(|| "the top level".to_string());
            print!(
                "{}",
                render::render_messages(&[CmdMessage::success(format!(
                    "Moved {} to {}",
                    cat.name, target
                ))])
            );
        }
        CategoryCommands::Archive { id } => {
            let changed = api.archive_category(&id)?;
            let message = if changed.is_empty() {
                CmdMessage::info("Already archived")
            } else {
                CmdMessage::success(format!("Archived {} categories", changed.len()))
            };
            print!("{}", render::render_messages(&[message]));
        }
        CategoryCommands::Unarchive { id } => {
            let message = if api.unarchive_category(&id)? {
                CmdMessage::success(format!("Restored {}", id))
            } else {
                CmdMessage::info("Not archived")
            };
            print!("{}", render::render_messages(&[message]));
        }
        CategoryCommands::Show { id } => {
            let cat = api.get_category(&id)?;
            let path: Vec<String> = api
                .ancestors(&id)?
                .iter()
                .map(|c| c.name.clone())
                .collect();
            print!("{}", render::render_category(cat, &path));
        }
        CategoryCommands::Tree { all } => {
            let categories = api.list_categories(all);
            print!("{}", render::render_tree(&categories));
        }
    }
    Ok(())
}

pub fn rule<B: StorageBackend>(api: &mut ShelfApi<B>, action: RuleCommands) -> Result<()> {
    match action {
        RuleCommands::Add {
            name,
            operator,
            value,
            priority,
            inactive,
            category,
        } => {
            let draft = RuleDraft::new(name, ConditionDraft::new(operator, value))
                .with_priority(priority)
                .with_active(!inactive);
            let rule = api.add_rule(draft)?;
            let mut messages = vec![CmdMessage::success(format!(
                "Created rule {} ({})",
                rule.name, rule.id
            ))];
            if let Some(category) = category {
                let cat = api.assign_rule(&category, &rule.id)?;
                messages.push(CmdMessage::info(format!("Assigned to {}", cat.name)));
            }
            print!("{}", render::render_messages(&messages));
        }
        RuleCommands::List => {
            let mut owners: HashMap<String, Vec<String>> = HashMap::new();
            for cat in api.list_categories(true) {
                for rule_id in &cat.metadata.rules {
                    owners.entry(rule_id.clone()).or_default().push(cat.name.clone());
                }
            }
            let ordered = shelfapp::commands::rules::ordered_rules(api.list_rules());
            print!("{}", render::render_rules(&ordered, &owners));
        }
        RuleCommands::Assign {
            rule_id,
            category_id,
        } => {
            let cat = api.assign_rule(&category_id, &rule_id)?;
            print!(
                "{}",
                render::render_messages(&[CmdMessage::success(format!(
                    "{} now uses rule {}",
                    cat.name, rule_id
                ))])
            );
        }
        RuleCommands::Unassign {
            rule_id,
            category_id,
        } => {
            let cat = api.unassign_rule(&category_id, &rule_id)?;
            print!(
                "{}",
                render::render_messages(&[CmdMessage::success(format!(
                    "{} no longer uses rule {}",
                    cat.name, rule_id
                ))])
            );
        }
        RuleCommands::Enable { rule_id } => toggle(api, &rule_id, true)?,
        RuleCommands::Disable { rule_id } => toggle(api, &rule_id, false)?,
        RuleCommands::Test { text, rule } => {
            let message = match rule {
                Some(rule_id) => {
                    if api.test_rule(&text, &rule_id)? {
                        CmdMessage::success(format!("\"{}\" matches {}", text, rule_id))
                    } else {
                        CmdMessage::warning(format!("\"{}\" does not match {}", text, rule_id))
                    }
                }
                None => match api.find_matching_category(&text) {
                    Some(cat) => CmdMessage::success(format!("\"{}\" → {}", text, cat.name)),
                    None => CmdMessage::warning(format!("No rule matches \"{}\"", text)),
                },
            };
            print!("{}", render::render_messages(&[message]));
        }
    }
    Ok(())
}

fn toggle<B: StorageBackend>(api: &mut ShelfApi<B>, rule_id: &str, active: bool) -> Result<()> {
    let rule = api.set_rule_active(rule_id, active)?;
    let state = if rule.is_active { "enabled" } else { "disabled" };
    print!(
        "{}",
        render::render_messages(&[CmdMessage::success(format!("Rule {} {}", rule.name, state))])
    );
    Ok(())
}

pub fn purchase<B: StorageBackend>(
    api: &mut ShelfApi<B>,
    name: &str,
    category: Option<&str>,
) -> Result<()> {
    let item = api.add_purchase(name, category)?;
    let filed = item
        .category
        .as_deref()
        .map(|id| format!(" under {}", name_of(api)(id)))
        .unwrap_or_default();
    print!(
        "{}",
        render::render_messages(&[CmdMessage::success(format!(
            "Recorded {} (x{}){}",
            item.product_name, item.frequency, filed
        ))])
    );
    Ok(())
}

pub fn suggest<B: StorageBackend>(api: &ShelfApi<B>, name: &str, json: bool) -> Result<()> {
    match api.suggest_category(name) {
        Some(suggestion) if json => println!("{}", serde_json::to_string_pretty(&suggestion)?),
        Some(suggestion) => print!("{}", render::render_suggestion(&suggestion, name_of(api))),
        None => print!(
            "{}",
            render::render_messages(&[CmdMessage::warning(
                "No active categories to suggest from"
            )])
        ),
    }
    Ok(())
}

pub fn history<B: StorageBackend>(api: &ShelfApi<B>) -> Result<()> {
    let mut items = api.history();
    items.sort_by(|a, b| b.last_purchased.cmp(&a.last_purchased));
    print!("{}", render::render_history(&items, name_of(api)));
    Ok(())
}

pub fn export<B: StorageBackend>(
    api: &ShelfApi<B>,
    options: ExportOptions,
    output: Option<PathBuf>,
) -> Result<()> {
    let content = api.export_categories(&options)?;
    emit(output.as_deref(), content.trim_end())
}

pub fn import<B: StorageBackend>(
    api: &mut ShelfApi<B>,
    file: &Path,
    format: ExportFormat,
    conflict: Option<ConflictResolution>,
    rules: bool,
    no_validate: bool,
) -> Result<()> {
    let data = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let mut options = api.config().import_options(format);
    if let Some(conflict) = conflict {
        options.conflict_resolution = conflict;
    }
    options.import_rules = rules;
    if no_validate {
        options.validate_hierarchy = false;
    }
    let report = api.import_categories(&data, &options)?;
    print!("{}", render::render_import_report(&report));
    Ok(())
}

pub fn template<B: StorageBackend>(api: &mut ShelfApi<B>, action: TemplateCommands) -> Result<()> {
    match action {
        TemplateCommands::Export {
            categories,
            languages,
            default_language,
            no_metadata,
            output,
        } => {
            let options = TemplateOptions {
                languages,
                default_language: default_language
                    .unwrap_or_else(|| api.config().locale.clone()),
                include_metadata: !no_metadata,
            };
            let template = api.export_template(&categories, &options)?;
            emit(
                output.as_deref(),
                &serde_json::to_string_pretty(&template)?,
            )?;
        }
        TemplateCommands::Import {
            file,
            language,
            fallback,
        } => {
            let data =
                fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
            let defaults = api.config().template_import_options();
            let options = TemplateImportOptions {
                target_language: language.unwrap_or(defaults.target_language),
                fallback_language: fallback.unwrap_or(defaults.fallback_language),
                ..defaults
            };
            let report = api.import_template(&data, Some(options))?;
            print!("{}", render::render_import_report(&report));
        }
    }
    Ok(())
}
