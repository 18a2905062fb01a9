use crate::infra::{load_catalog, InMemoryReportStore};
use clap::Args;
use programme_monitor::config::ReportingConfig;
use programme_monitor::error::AppError;
use programme_monitor::workflows::reporting::{
    DraftAssessment, ProgrammeCatalog, ProgrammeId, ReportDraft, ReportSession, ReportingService,
    SubmissionValidator, ValidationConfig,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional CSV catalog; defaults to the built-in programmes.
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Programme to report against in the walkthrough.
    #[arg(long, default_value_t = 1)]
    pub(crate) programme_id: u32,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Programme identifier from the catalog
    #[arg(long)]
    pub(crate) programme_id: Option<u32>,
    /// Reported actual value, as typed by the reporter
    #[arg(long, default_value = "")]
    pub(crate) actual: String,
    /// Deviation explanation, if any
    #[arg(long)]
    pub(crate) explanation: Option<String>,
    /// Variance threshold percent that requires an explanation
    #[arg(long)]
    pub(crate) threshold_pct: Option<f64>,
    /// Optional CSV catalog; defaults to the built-in programmes.
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let mut validation = ValidationConfig::default();
    if let Some(threshold_pct) = args.threshold_pct {
        validation.deviation_threshold_pct = threshold_pct;
    }
    let validator = SubmissionValidator::new(&validation);

    let mut draft = ReportDraft::empty();
    if let Some(id) = args.programme_id {
        draft = draft.with_programme(ProgrammeId(id));
    }
    draft = draft.with_actual_value(args.actual);
    if let Some(text) = args.explanation {
        draft = draft.with_explanation(text);
    }

    let assessment = validator.assess(&draft, &catalog);
    render_assessment(&catalog, &draft, &assessment);
    match serde_json::to_string_pretty(&assessment) {
        Ok(json) => println!("\nAssessment payload:\n{}", json),
        Err(err) => println!("\nAssessment payload unavailable: {}", err),
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let catalog = Arc::new(load_catalog(args.catalog.as_deref())?);
    let programme_id = ProgrammeId(args.programme_id);
    let Some(programme) = catalog.find(programme_id).cloned() else {
        println!("Programme {} is not in the catalog", programme_id);
        return Ok(());
    };

    let store = Arc::new(InMemoryReportStore::default());
    let service = Arc::new(ReportingService::new(
        catalog.clone(),
        store.clone(),
        &ReportingConfig::default(),
    ));
    let session = ReportSession::new(service);

    println!("Programme reporting demo");
    println!(
        "Programme: {} ({}) - {} for {}",
        programme.name, programme.department, programme.indicator, programme.quarter
    );
    println!("Target: {} {}", programme.target, programme.unit);

    println!("\n1. Small shortfall");
    session.select_programme(programme_id);
    let assessment = session.set_actual_value(format!("{}", programme.target * 0.95));
    render_assessment(&catalog, &session.draft(), &assessment);
    match session.submit().await {
        Ok(receipt) => println!("  {}", receipt.message()),
        Err(err) => println!("  Submission failed: {}", err),
    }

    println!("\n2. Significant shortfall");
    session.select_programme(programme_id);
    let assessment = session.set_actual_value(format!("{}", programme.target * 0.7));
    render_assessment(&catalog, &session.draft(), &assessment);
    if let Err(err) = session.submit().await {
        println!("  Submission blocked:");
        for error in err.validation_errors() {
            println!("  - {}", error);
        }
    }
    session.set_explanation("Field teams were redeployed during the quarter.");
    match session.submit().await {
        Ok(receipt) => println!("  With explanation: {}", receipt.message()),
        Err(err) => println!("  Submission failed: {}", err),
    }

    println!("\n3. Empty form");
    match session.save_draft().await {
        Ok(ack) => println!("  Unexpectedly saved as {}", ack.reference),
        Err(err) => {
            for error in err.validation_errors() {
                println!("  - {}", error);
            }
        }
    }

    println!("\nReports stored: {}", store.records().len());
    for (action, record) in store.records() {
        println!(
            "  {} programme {} {} ({})",
            action,
            record.programme_id,
            record.quarter,
            record.status.label()
        );
    }

    Ok(())
}

fn render_assessment(catalog: &ProgrammeCatalog, draft: &ReportDraft, assessment: &DraftAssessment) {
    let programme = draft.programme_id.and_then(|id| catalog.find(id));
    match (programme, &assessment.figures) {
        (Some(programme), Some(figures)) => {
            println!(
                "  {}: actual {} {} against target {} ({:+.1}%, {})",
                programme.name,
                figures.actual,
                figures.unit,
                figures.target,
                figures.percent_display,
                figures.status_label
            );
            if assessment.explanation_required {
                println!("  Deviation explanation required");
            }
        }
        (Some(programme), None) => println!("  {}: no valid actual value yet", programme.name),
        (None, _) => println!("  No programme selected"),
    }

    if assessment.is_valid() {
        println!("  Ready to save or submit");
    } else {
        for error in &assessment.errors {
            println!("  ! {}", error);
        }
    }
}
