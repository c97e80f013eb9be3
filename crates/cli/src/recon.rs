//! `registrum run` / `validate` / `fields`: config-driven entity reconciliation.

use std::io::Read;
use std::path::{Path, PathBuf};

use registrum_recon::model::{ExtractIssue, ReconSummary, ScoreIssue};
use registrum_recon::{
    AliasConfig, CanonicalField, LocalityResolver, NoLocalities, PostcodeTable, ReconError,
    ReconReport, ReconciledRecord, Reconciler, SourceBundle,
};
use serde::Serialize;

use crate::exit_codes::{EXIT_CONTESTED, EXIT_INVALID_CONFIG, EXIT_RUNTIME};
use crate::CliError;

pub struct RunArgs {
    pub bundle: PathBuf,
    pub config: Option<PathBuf>,
    pub postcodes: Option<PathBuf>,
    pub capture_name_keys: bool,
    pub json: bool,
    pub output: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// JSON output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RunOutput<'a> {
    meta: RunMeta,
    summary: &'a ReconSummary,
    fields: &'a ReconciledRecord,
    issues: RunIssues<'a>,
}

#[derive(Serialize)]
struct RunMeta {
    config_name: String,
    engine_version: String,
    run_at: String,
    postcodes: Option<usize>,
}

#[derive(Serialize)]
struct RunIssues<'a> {
    extract: &'a [ExtractIssue],
    score: &'a [ScoreIssue],
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> Result<AliasConfig, CliError> {
    match path {
        Some(path) => AliasConfig::from_path(path).map_err(|e| match e {
            ReconError::Io(msg) => CliError::new(EXIT_RUNTIME, msg),
            other => CliError::new(EXIT_INVALID_CONFIG, other.to_string())
                .with_hint("run `registrum validate <config>` for details"),
        }),
        None => Ok(AliasConfig::default()),
    }
}

fn read_bundle_text(path: &Path) -> Result<String, CliError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::new(EXIT_RUNTIME, format!("cannot read stdin: {e}")))?;
        return Ok(buf);
    }
    std::fs::read_to_string(path)
        .map_err(|e| CliError::new(EXIT_RUNTIME, format!("cannot read {}: {e}", path.display())))
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    if args.capture_name_keys {
        config.capture_name_keys = true;
    }

    let postcodes = match args.postcodes {
        Some(ref path) => Some(
            PostcodeTable::from_path(path)
                .map_err(|e| CliError::new(EXIT_RUNTIME, e.to_string()))?,
        ),
        None => None,
    };
    let resolver: &dyn LocalityResolver = match postcodes {
        Some(ref table) => table,
        None => &NoLocalities,
    };

    let text = read_bundle_text(&args.bundle)?;
    let bundle = SourceBundle::from_json_str(&text, &config.envelope).map_err(|e| {
        CliError::new(EXIT_RUNTIME, e.to_string())
            .with_hint("expected a JSON object of source name -> record(s)")
    })?;

    let report: ReconReport = Reconciler::new(&config, resolver).run(&bundle);

    let output = RunOutput {
        meta: RunMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            postcodes: postcodes.as_ref().map(|t| t.len()),
        },
        summary: &report.summary,
        fields: &report.fields,
        issues: RunIssues {
            extract: &report.extract_issues,
            score: &report.score_issues,
        },
    };

    let json_str = serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::new(EXIT_RUNTIME, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::new(EXIT_RUNTIME, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &report.summary;
    eprintln!(
        "reconciled {} fields from {} sources: {} high, {} medium, {} low",
        s.total_fields, s.sources, s.scores.high, s.scores.medium, s.scores.low,
    );
    if s.extract_issues + s.score_issues > 0 {
        eprintln!(
            "dropped: {} observations, {} fields (rerun with --verbose for details)",
            s.extract_issues, s.score_issues
        );
    }

    if s.is_contested() {
        let names: Vec<&str> = s.contested_fields.iter().map(|f| f.as_str()).collect();
        return Err(CliError::new(
            EXIT_CONTESTED,
            format!("contested fields: {}", names.join(", ")),
        ));
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = AliasConfig::from_path(&config_path).map_err(|e| match e {
        ReconError::Io(msg) => CliError::new(EXIT_RUNTIME, msg),
        other => CliError::new(EXIT_INVALID_CONFIG, other.to_string()),
    })?;

    let aliases: usize = config.fields.iter().map(|r| r.aliases.len()).sum();
    eprintln!(
        "{}: valid ({} fields, {} aliases, {} suppression rules)",
        config.name,
        config.fields.len(),
        aliases,
        config.suppress.len()
    );
    Ok(())
}

pub fn cmd_fields(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;

    for field in CanonicalField::ALL {
        let actions: Vec<String> = field.actions().iter().map(|a| a.to_string()).collect();
        let aliases = config.aliases_for(field).join(", ");
        println!("{}\t{}\t{}", field, actions.join(","), aliases);
    }
    Ok(())
}
