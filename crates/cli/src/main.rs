use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trials_api_client::HttpTrialsApi;
use trials_core::api::{search_outcome, summary_outcome};
use trials_core::map::marker_specs;
use trials_core::markup::or_fallback;
use trials_core::render;
use trials_core::trial_types::SummaryRequest;
use trials_core::{ClientConfig, SearchCriteria, TrialRecord, TrialsApi, TrialsError};

const DEFAULT_API_BASE: &str = "http://localhost:8080";

#[derive(Parser)]
#[command(name = "trials")]
#[command(about = "Clinical trial finder CLI")]
struct Cli {
    /// Base URL of the search backend
    #[arg(long, env = "TRIALS_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for trials and list them
    Search {
        #[command(flatten)]
        criteria: CriteriaArgs,
        /// Write the rendered result list to this file
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Search for trials, then request a lay summary of one of them
    Summarize {
        /// Trial identifier from the search results
        trial_id: String,
        #[command(flatten)]
        criteria: CriteriaArgs,
    },
}

/// Search form fields, forwarded to the backend as typed.
#[derive(Args, Clone, Debug)]
struct CriteriaArgs {
    /// Patient age
    #[arg(long, default_value = "")]
    age: String,
    /// Medical condition
    #[arg(long, default_value = "")]
    condition: String,
    /// City, state or ZIP code
    #[arg(long, default_value = "")]
    location: String,
    /// Search radius in miles
    #[arg(long, default_value = "")]
    distance: String,
}

impl From<CriteriaArgs> for SearchCriteria {
    fn from(args: CriteriaArgs) -> Self {
        SearchCriteria {
            age: args.age,
            condition: args.condition,
            location: args.location,
            distance: args.distance,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trials_cli=info".parse()?)
                .add_directive("trials_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = client_config(&cli)?;
    let api = HttpTrialsApi::new(&config)?;

    match cli.command {
        Some(Commands::Search { criteria, html }) => {
            let trials = search(&api, criteria.into()).await?;
            println!("{}", search_report(&trials));
            if let Some(path) = html {
                write_html_report(&path, &trials)?;
                println!("Wrote {}", path.display());
            }
        }
        Some(Commands::Summarize { trial_id, criteria }) => {
            let trials = search(&api, criteria.into()).await?;
            let summary = summarize(&api, &trials, &trial_id).await?;
            println!("{}", summary);
        }
        None => {
            println!("Use 'trials --help' for commands");
        }
    }

    Ok(())
}

/// The CLI only lists and summarises, so only the backend address is configurable.
fn client_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    ClientConfig::new(&cli.api_base).with_context(|| format!("bad --api-base {}", cli.api_base))
}

async fn search(api: &impl TrialsApi, criteria: SearchCriteria) -> anyhow::Result<Vec<TrialRecord>> {
    tracing::info!("searching for {:?} near {:?}", criteria.condition, criteria.location);
    let response = api.search_trials(&criteria).await?;
    Ok(search_outcome(response).context("Error fetching clinical trials")?)
}

async fn summarize(
    api: &impl TrialsApi,
    trials: &[TrialRecord],
    trial_id: &str,
) -> anyhow::Result<String> {
    let trial = trials
        .iter()
        .find(|t| t.id == *trial_id)
        .ok_or_else(|| TrialsError::TrialNotFound(trial_id.to_string()))?;

    tracing::info!("requesting summary for {}", trial.id);
    let response = api
        .generate_summary(&SummaryRequest::for_trial(trial))
        .await?;
    Ok(summary_outcome(response).context("Error generating summary")?)
}

/// One line per trial, then totals.
fn search_report(trials: &[TrialRecord]) -> String {
    if trials.is_empty() {
        return "No clinical trials found matching your criteria.".to_string();
    }

    let mut lines: Vec<String> = trials
        .iter()
        .map(|trial| {
            format!(
                "{}  {}  [{}, {}]",
                trial.id,
                or_fallback(trial.title.as_deref(), "Unnamed Trial"),
                or_fallback(trial.phase.as_deref(), "Not specified"),
                or_fallback(trial.status.as_deref(), "Unknown"),
            )
        })
        .collect();
    lines.push(format!(
        "{} trials, {} mappable sites",
        trials.len(),
        marker_specs(trials).len()
    ));
    lines.join("\n")
}

fn write_html_report(path: &Path, trials: &[TrialRecord]) -> anyhow::Result<()> {
    let html = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Clinical Trials</title></head>\n<body>\n{}\n</body>\n</html>\n",
        render::render_list(trials)
    );
    std::fs::write(path, html).with_context(|| format!("cannot write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::cell::RefCell;
    use trials_core::trial_types::{SearchResponse, SummaryResponse};
    use trials_core::TrialsResult;

    struct ScriptedApi {
        search: RefCell<Option<SearchResponse>>,
        summary: RefCell<Option<SummaryResponse>>,
        summary_requests: RefCell<Vec<SummaryRequest>>,
    }

    impl ScriptedApi {
        fn new(search: SearchResponse, summary: SummaryResponse) -> Self {
            Self {
                search: RefCell::new(Some(search)),
                summary: RefCell::new(Some(summary)),
                summary_requests: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl TrialsApi for ScriptedApi {
        async fn search_trials(&self, _criteria: &SearchCriteria) -> TrialsResult<SearchResponse> {
            self.search
                .borrow_mut()
                .take()
                .ok_or_else(|| TrialsError::Network("no reply".into()))
        }

        async fn generate_summary(&self, request: &SummaryRequest) -> TrialsResult<SummaryResponse> {
            self.summary_requests.borrow_mut().push(request.clone());
            self.summary
                .borrow_mut()
                .take()
                .ok_or_else(|| TrialsError::Network("no reply".into()))
        }
    }

    fn trials() -> Vec<TrialRecord> {
        serde_json::from_value(json!([
            {
                "id": "NCT1",
                "title": "Flu Vaccine Study",
                "phase": "Phase 2",
                "status": "Recruiting",
                "locations": [
                    { "city": "Austin", "latitude": 30.2, "longitude": -97.7 },
                    { "city": "Nowhere" }
                ]
            },
            { "id": "NCT2" }
        ]))
        .unwrap()
    }

    #[test]
    fn report_lists_trials_and_mappable_sites() {
        let report = search_report(&trials());
        assert_eq!(
            report,
            "NCT1  Flu Vaccine Study  [Phase 2, Recruiting]\n\
             NCT2  Unnamed Trial  [Not specified, Unknown]\n\
             2 trials, 1 mappable sites"
        );
    }

    #[test]
    fn api_base_flag_builds_the_client_config() {
        let cli = Cli::try_parse_from([
            "trials",
            "--api-base",
            "http://search.local:5000/",
            "search",
            "--condition",
            "asthma",
        ])
        .unwrap();
        let config = client_config(&cli).unwrap();
        assert_eq!(config.search_url(), "http://search.local:5000/api/search_trials");
        assert_eq!(config.max_zoom(), trials_core::constants::DEFAULT_MAX_ZOOM);
    }

    #[test]
    fn bad_api_base_is_rejected() {
        let cli = Cli::try_parse_from(["trials", "--api-base", "http://search.local?key=1"]).unwrap();
        assert!(client_config(&cli).is_err());
    }

    #[test]
    fn empty_report() {
        assert_eq!(
            search_report(&[]),
            "No clinical trials found matching your criteria."
        );
    }

    #[tokio::test]
    async fn backend_rejection_is_reported_with_reason() {
        let api = ScriptedApi::new(
            SearchResponse::failure("too many results"),
            SummaryResponse::success("unused"),
        );
        let err = search(&api, SearchCriteria::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Error fetching clinical trials");
        assert_eq!(err.root_cause().to_string(), "too many results");
    }

    #[tokio::test]
    async fn summarize_sends_the_matching_trial() {
        let api = ScriptedApi::new(
            SearchResponse::success(trials()),
            SummaryResponse::success("A study of flu vaccines."),
        );
        let found = search(&api, SearchCriteria::default()).await.unwrap();

        let summary = summarize(&api, &found, "NCT1").await.unwrap();

        assert_eq!(summary, "A study of flu vaccines.");
        let requests = api.summary_requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].trial_id.as_str(), "NCT1");
    }

    #[tokio::test]
    async fn summarize_unknown_trial_sends_nothing() {
        let api = ScriptedApi::new(
            SearchResponse::success(Vec::new()),
            SummaryResponse::success("unused"),
        );
        let err = summarize(&api, &trials(), "NCT9").await.unwrap_err();
        assert_eq!(err.to_string(), "trial not found: NCT9");
        assert!(api.summary_requests.borrow().is_empty());
    }

    #[test]
    fn html_report_wraps_rendered_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");
        write_html_report(&path, &trials()).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Flu Vaccine Study"));
        assert!(html.contains(r#"data-trial-id="NCT2""#));
    }
}
