use grantscout_core::{PassthroughCleaner, Pipeline, PipelineConfig, open_destination};
use serde_json::json;
use tempfile::TempDir;

use crate::common::{ScriptedService, StaticSite, grant_exemplar};

const SEED: &str = "https://example.org/grants";
const DISCOVERY_MARKER: &str = "individual grant programs";

fn read_lines(path: &std::path::Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[tokio::test]
async fn writes_populated_and_degraded_records_to_file() {
    let site = StaticSite::new(&[
        (SEED, "<ul><li><a href='/grantA'>A</a></li><li><a href='/grantB'>B</a></li></ul>"),
        ("https://example.org/grantA", "<h1>Grant A</h1><p>Up to $1,500.</p>"),
    ]);
    let service = ScriptedService::new(
        &[
            (
                DISCOVERY_MARKER,
                json!({"links": ["https://example.org/grantA", "https://example.org/grantB"]}),
            ),
            (
                "<h1>Grant A</h1>",
                json!({
                    "title": "Grant A",
                    "amountMax": 1500,
                    "eligibility": ["Undergraduate"],
                    "url": "https://example.org/grantA"
                }),
            ),
        ],
        "{}",
    );

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("grants.jsonl");
    let pipeline = Pipeline::new(
        site,
        PassthroughCleaner,
        service,
        grant_exemplar(),
        PipelineConfig::default(),
    );

    let dest = open_destination(path.to_str().unwrap()).unwrap();
    let report = pipeline.run_to(SEED, dest).await.unwrap();

    assert_eq!(report.summary.written, 2);
    let lines = read_lines(&path);
    assert_eq!(lines.len(), 2);

    assert_eq!(lines[0]["title"], "Grant A");
    assert_eq!(lines[0]["amountMax"], 1500);
    assert!(lines[0]["deadline"].is_null());
    assert_eq!(lines[0].as_object().unwrap().len(), 8);

    let second = lines[1].as_object().unwrap();
    assert_eq!(second.len(), 8);
    assert!(second.values().all(serde_json::Value::is_null));
}

#[tokio::test]
async fn empty_listing_creates_empty_file() {
    let site = StaticSite::new(&[(SEED, "<p>Check back next cycle.</p>")]);
    let service = ScriptedService::new(&[(DISCOVERY_MARKER, json!({"links": []}))], "{}");

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("grants.jsonl");
    let pipeline = Pipeline::new(
        site,
        PassthroughCleaner,
        service.clone(),
        grant_exemplar(),
        PipelineConfig::default(),
    );

    let dest = open_destination(path.to_str().unwrap()).unwrap();
    let report = pipeline.run_to(SEED, dest).await.unwrap();

    assert_eq!(report.summary.written, 0);
    assert_eq!(report.summary.discovered, 0);
    assert!(path.exists());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    assert_eq!(*service.calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn bounded_concurrency_keeps_output_order() {
    let links: Vec<String> = (1..=6)
        .map(|i| format!("https://example.org/grant{i}"))
        .collect();
    let mut pages = vec![(SEED.to_string(), "<p>listing</p>".to_string())];
    let mut answers = vec![(DISCOVERY_MARKER.to_string(), json!({ "links": links }))];
    for i in 1..=6 {
        pages.push((
            format!("https://example.org/grant{i}"),
            format!("<h1>DETAIL-{i}</h1>"),
        ));
        answers.push((format!("DETAIL-{i}<"), json!({ "title": format!("Grant {i}") })));
    }

    let page_refs: Vec<(&str, &str)> = pages
        .iter()
        .map(|(u, b)| (u.as_str(), b.as_str()))
        .collect();
    let answer_refs: Vec<(&str, serde_json::Value)> =
        answers.iter().map(|(m, v)| (m.as_str(), v.clone())).collect();

    let pipeline = Pipeline::new(
        StaticSite::new(&page_refs),
        PassthroughCleaner,
        ScriptedService::new(&answer_refs, "{}"),
        grant_exemplar(),
        PipelineConfig::default().with_concurrency(4),
    );

    let report = pipeline.run(SEED).await;
    let titles: Vec<String> = report
        .batch
        .records()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect();
    let expected: Vec<String> = (1..=6).map(|i| format!("Grant {i}")).collect();
    assert_eq!(titles, expected);
    assert!(report.summary.is_complete());
}
