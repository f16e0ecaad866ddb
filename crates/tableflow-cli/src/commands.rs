use std::cell::Cell;
use std::path::Path;
use std::process::ExitCode;
use std::rc::Rc;

use serde_json::{Value, json};
use tableflow_catalog::{
    CatalogSource, CatalogState, FileCatalogSource, HttpCatalogSource, load as load_catalog,
};
use tableflow_core::{CapabilityCatalog, OptionsShape, ValidationMethod, ValidationOptions};
use tableflow_embed::{ChannelHandlers, EventChannel, EventKind, ImporterMessage, MessageBus};
use tableflow_rules::{
    RuleEngine, ValidationReport, check_template as check_template_json, list_data_type_options,
    normalize_list_input, normalize_pattern_input, normalize_range_input, template_json_schema,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::workspace::{load_or_create_settings, write_json_atomic};
use crate::{CatalogArgs, CliError, Context, NormalizeArgs};

/// Workspace id reported for catalogs read from a file.
const LOCAL_WORKSPACE: &str = "local";

struct ResolvedSource {
    source: Box<dyn CatalogSource>,
    workspace_id: String,
}

pub(crate) fn init(ctx: &Context) -> Result<ExitCode, CliError> {
    let existed = ctx.paths.is_initialized();
    ctx.paths.ensure_dirs()?;
    load_or_create_settings(&ctx.paths)?;

    tracing::info!(
        event = "workspace_initialized",
        root = %ctx.paths.root.display(),
        existed
    );
    if existed {
        println!("workspace already initialized at {}", ctx.paths.root.display());
    } else {
        println!("initialized workspace at {}", ctx.paths.root.display());
    }
    Ok(ExitCode::SUCCESS)
}

pub(crate) async fn catalog(
    ctx: &Context,
    args: &CatalogArgs,
    save: bool,
) -> Result<ExitCode, CliError> {
    let resolved = resolve_source(ctx, args).await?;
    let catalog = resolved.source.fetch(&resolved.workspace_id).await?;
    tracing::info!(
        event = "catalog_fetched",
        source = resolved.source.name(),
        workspace_id = %resolved.workspace_id,
        data_types = catalog.len()
    );

    if save {
        let path = ctx.paths.catalog_cache_path(&resolved.workspace_id);
        write_json_atomic(&path, &catalog)?;
        tracing::info!(event = "catalog_cached", path = %path.display());
        eprintln!("cached catalog at {}", path.display());
    }

    print_json(&catalog)?;
    Ok(ExitCode::SUCCESS)
}

pub(crate) async fn data_types(ctx: &Context, args: &CatalogArgs) -> Result<ExitCode, CliError> {
    let catalog = lenient_catalog(ctx, args).await;
    print_json(&list_data_type_options(&catalog))?;
    Ok(ExitCode::SUCCESS)
}

pub(crate) async fn methods(
    ctx: &Context,
    args: &CatalogArgs,
    data_type: &str,
) -> Result<ExitCode, CliError> {
    let mut engine = RuleEngine::new(lenient_catalog(ctx, args).await);
    let change = engine.on_data_type_changed(data_type);

    print_json(&json!({
        "data_type": data_type,
        "methods": change.method_options,
        "must_hide_method_control": change.must_hide_method_control,
    }))?;
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn normalize(args: &NormalizeArgs) -> Result<ExitCode, CliError> {
    let method = ValidationMethod::from(args.method.trim());
    print_json(&normalized_options(&method, args))?;
    Ok(ExitCode::SUCCESS)
}

fn normalized_options(
    method: &ValidationMethod,
    args: &NormalizeArgs,
) -> Option<ValidationOptions> {
    match method.options_shape() {
        OptionsShape::Range => normalize_range_input(
            method,
            args.min.as_deref().unwrap_or_default(),
            args.max.as_deref().unwrap_or_default(),
        ),
        OptionsShape::Pattern => Some(normalize_pattern_input(
            args.pattern.as_deref().unwrap_or_default(),
        )),
        OptionsShape::List => Some(normalize_list_input(&args.items)),
        OptionsShape::NoOptions => None,
    }
}

pub(crate) async fn check_template(
    ctx: &Context,
    args: &CatalogArgs,
    file: &Path,
    as_json: bool,
) -> Result<ExitCode, CliError> {
    let contents = tokio::fs::read_to_string(file).await?;
    let template_json: Value = serde_json::from_str(&contents)?;
    let template_schema = serde_json::to_value(template_json_schema())?;
    let catalog = lenient_catalog(ctx, args).await;

    match check_template_json(&template_json, &template_schema, &catalog) {
        Ok(validated) => {
            tracing::info!(
                event = "template_validated",
                path = %file.display(),
                columns = validated.template.columns.len(),
                warnings = validated.warnings.len()
            );
            let report = ValidationReport {
                errors: Vec::new(),
                warnings: validated.warnings,
            };
            if as_json {
                print_json(&report)?;
            } else {
                print_issues(&report);
                println!(
                    "template {} is valid ({} columns)",
                    file.display(),
                    validated.template.columns.len()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(report) => {
            tracing::warn!(
                event = "template_rejected",
                path = %file.display(),
                errors = report.errors.len(),
                codes = ?report.codes()
            );
            if as_json {
                print_json(&report)?;
            } else {
                print_issues(&report);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

pub(crate) async fn listen(importer_id: &str) -> Result<ExitCode, CliError> {
    let bus = MessageBus::new();
    let closed = Rc::new(Cell::new(false));

    let on_close = Rc::clone(&closed);
    let mut channel: EventChannel = EventChannel::start(
        &bus,
        importer_id,
        ChannelHandlers::new()
            .on_complete(|data| println!("{}", json!({"event": "complete", "data": data})))
            .on_close(move || {
                println!("{}", json!({"event": "close"}));
                on_close.set(true);
            }),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(message) => bus.post(message),
            Err(err) => {
                tracing::warn!(event = "listen_line_skipped", error = %err);
            }
        }
        if closed.get() {
            break;
        }
    }

    channel.stop();
    tracing::info!(
        event = "listen_finished",
        importer_id = %importer_id,
        delivered = channel.delivered_count()
    );
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn emit(
    importer_id: &str,
    kind: EventKind,
    data: Option<&str>,
) -> Result<ExitCode, CliError> {
    let data = data.map(serde_json::from_str::<Value>).transpose()?;
    let message = ImporterMessage::new(importer_id, kind, data);
    println!("{}", message.to_value()?);
    Ok(ExitCode::SUCCESS)
}

async fn resolve_source(ctx: &Context, args: &CatalogArgs) -> Result<ResolvedSource, CliError> {
    let configured = args
        .workspace
        .clone()
        .or_else(|| ctx.settings.workspace_id.clone());

    if let Some(path) = &args.catalog {
        return Ok(ResolvedSource {
            source: Box::new(FileCatalogSource::new(path)),
            workspace_id: configured.unwrap_or_else(|| LOCAL_WORKSPACE.to_string()),
        });
    }

    let http = HttpCatalogSource::new(ctx.settings.http_options())?;
    let workspace_id = match configured {
        Some(id) => id,
        None => http.resolve_workspace_id().await?,
    };
    Ok(ResolvedSource {
        source: Box::new(http),
        workspace_id,
    })
}

/// Catalog for read-only commands: a failed fetch falls back to the
/// workspace cache, then to an empty catalog.
async fn lenient_catalog(ctx: &Context, args: &CatalogArgs) -> CapabilityCatalog {
    let resolved = match resolve_source(ctx, args).await {
        Ok(resolved) => resolved,
        Err(err) => {
            tracing::warn!(event = "catalog_unavailable", error = %err);
            let fallback = args
                .workspace
                .as_deref()
                .or(ctx.settings.workspace_id.as_deref());
            return match fallback {
                Some(workspace_id) => cached_catalog(ctx, workspace_id).await,
                None => unavailable(),
            };
        }
    };

    match load_catalog(resolved.source.as_ref(), &resolved.workspace_id).await {
        CatalogState::Loaded(catalog) => catalog,
        _ if args.catalog.is_none() => cached_catalog(ctx, &resolved.workspace_id).await,
        _ => unavailable(),
    }
}

async fn cached_catalog(ctx: &Context, workspace_id: &str) -> CapabilityCatalog {
    let path = ctx.paths.catalog_cache_path(workspace_id);
    if !path.is_file() {
        return unavailable();
    }

    let source = FileCatalogSource::new(&path);
    match load_catalog(&source, workspace_id).await {
        CatalogState::Loaded(catalog) => {
            eprintln!("using cached catalog from {}", path.display());
            catalog
        }
        _ => unavailable(),
    }
}

fn unavailable() -> CapabilityCatalog {
    eprintln!("capability catalog unavailable; continuing with an empty catalog");
    CapabilityCatalog::empty()
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_issues(report: &ValidationReport) {
    for issue in report.errors.iter().chain(&report.warnings) {
        eprintln!("{issue}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(method: &str) -> NormalizeArgs {
        NormalizeArgs {
            method: method.to_string(),
            min: None,
            max: None,
            pattern: None,
            items: Vec::new(),
        }
    }

    #[test]
    fn normalize_dispatches_on_method_shape() {
        let mut length = args("length");
        length.min = Some(" 3 ".to_string());
        length.max = Some("x".to_string());
        assert_eq!(
            serde_json::to_value(normalized_options(&ValidationMethod::Length, &length))
                .expect("serialize"),
            json!({"min": 3})
        );

        let mut list = args("list");
        list.items = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        assert_eq!(
            normalized_options(&ValidationMethod::List, &list),
            Some(ValidationOptions::List(vec!["a".to_string(), "b".to_string()]))
        );

        assert_eq!(
            normalized_options(&ValidationMethod::Regex, &args("regex")),
            Some(ValidationOptions::Pattern(String::new()))
        );
        assert_eq!(
            normalized_options(&ValidationMethod::from("email"), &args("email")),
            None
        );
    }
}
