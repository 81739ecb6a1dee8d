//! Workbench and editor session behavior against an in-memory flow service.

mod common;

use common::{Call, RecordingService};
use flowdeck_client::{Template, Workbench};
use flowdeck_core::{FlowId, TemplateId};
use flowdeck_workflow::{GraphModel, Position};
use serde_json::json;
use std::sync::Arc;

fn workbench(service: &Arc<RecordingService>) -> Workbench {
    Workbench::new(Arc::clone(service) as Arc<dyn flowdeck_client::FlowService>)
}

#[tokio::test]
async fn editor_run_saves_before_running() {
    let service = Arc::new(RecordingService::new());
    let mut workbench = workbench(&service);

    let mut session = workbench.create_empty("Daily Report", "").await.expect("create");
    let trigger = session.add_block("manual_trigger", None).expect("known block");
    let output = session
        .add_block("output", Some(Position::new(300.0, 100.0)))
        .expect("known block");
    session.connect(&trigger, &output).expect("connect");

    let result = session.run().await.expect("run");
    assert_eq!(result.status.as_deref(), Some("success"));

    let calls = service.calls();
    let update = calls
        .iter()
        .position(|c| *c == Call::Update(session.flow_id().clone()))
        .expect("update issued");
    let run = calls
        .iter()
        .position(|c| *c == Call::Run(session.flow_id().clone()))
        .expect("run issued");
    assert!(update < run, "{calls:?}");

    let stored = service.stored(session.flow_id()).expect("stored");
    let graph = stored.graph().expect("graph");
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
}

#[tokio::test]
async fn saved_graph_reopens_with_same_shape() {
    let service = Arc::new(RecordingService::new());
    let mut workbench = workbench(&service);

    let mut session = workbench.create_empty("Daily Report", "news").await.expect("create");
    let a = session.add_block("manual_trigger", None).expect("known");
    let b = session.add_block("web_search", None).expect("known");
    let c = session.add_block("send_email", None).expect("known");
    session.connect(&a, &b).expect("a -> b");
    session.connect(&b, &c).expect("b -> c");
    session.save().await.expect("save");
    let id = session.flow_id().clone();
    session.close();

    let reopened = workbench.open(&id).await.expect("open");
    assert!(reopened.import_report().is_complete());
    let graph = reopened.graph();
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(reopened.name(), "Daily Report");
    assert_eq!(reopened.description(), "news");
}

#[tokio::test]
async fn blank_names_save_as_untitled() {
    let service = Arc::new(RecordingService::new());
    let mut workbench = workbench(&service);

    let mut session = workbench.create_empty("  ", "").await.expect("create");
    assert_eq!(session.name(), "Untitled Flow");
    session.rename("");
    session.save().await.expect("save");
    assert_eq!(
        service.stored(session.flow_id()).expect("stored").name,
        "Untitled Flow"
    );
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let service = Arc::new(RecordingService::new());
    let mut workbench = workbench(&service);
    let id = workbench
        .create_empty("Keep me", "")
        .await
        .expect("create")
        .flow_id()
        .clone();

    let deleted = workbench.delete(&id, &|_: &str| false).await.expect("delete");
    assert!(!deleted);
    assert!(!service.calls().iter().any(|c| matches!(c, Call::Delete(_))));
    assert_eq!(workbench.list().await.expect("list").len(), 1);
}

#[tokio::test]
async fn confirmed_delete_removes_flow() {
    let service = Arc::new(RecordingService::new());
    let mut workbench = workbench(&service);
    let id = workbench
        .create_empty("Gone soon", "")
        .await
        .expect("create")
        .flow_id()
        .clone();

    let deleted = workbench
        .delete(&id, &|prompt: &str| prompt == "Delete this flow?")
        .await
        .expect("delete");
    assert!(deleted);
    assert!(workbench.list().await.expect("list").is_empty());

    let err = workbench.store().get(&id).await.unwrap_err();
    assert!(err.to_string().contains("Flow not found"), "{err}");
}

#[tokio::test]
async fn quick_run_runs_stored_flow_without_saving() {
    let service = Arc::new(RecordingService::new());
    let mut workbench = workbench(&service);
    let id = workbench
        .create_empty("Daily Report", "")
        .await
        .expect("create")
        .flow_id()
        .clone();

    let result = workbench.quick_run(&id).await.expect("run");
    assert!(result.summary(500).starts_with("Flow completed in 0.5s"));
    assert!(!service.calls().iter().any(|c| matches!(c, Call::Update(_))));

    let err = workbench.quick_run(&FlowId::new("missing")).await.unwrap_err();
    assert!(err.to_string().contains("404"), "{err}");
}

#[tokio::test]
async fn magic_wand_names_flow_from_goal() {
    let draft = json!({
        "nodes": {
            "node_1": {"type": "manual_trigger", "config": {}, "position": {"x": 50, "y": 50}},
            "node_2": {"type": "web_search", "config": {"query": "news"}, "position": {"x": 250, "y": 50}}
        },
        "edges": [{"from": "node_1", "to": "node_2"}]
    });
    let service = Arc::new(RecordingService::new().with_magic(draft));
    let mut workbench = workbench(&service);

    let session = workbench
        .magic("send me a daily digest of news")
        .await
        .expect("magic");
    assert_eq!(session.name(), "Send me a daily Flow");
    assert_eq!(session.description(), "send me a daily digest of news");
    assert_eq!(session.graph().edge_count(), 1);
    assert!(service.calls().contains(&Call::Magic("send me a daily digest of news".to_string())));
}

#[tokio::test]
async fn magic_wand_rejects_blank_goal_and_draft_without_nodes() {
    let service = Arc::new(RecordingService::new().with_magic(json!({"edges": []})));
    let mut workbench = workbench(&service);

    let err = workbench.magic("   ").await.err().expect("blank goal fails");
    assert!(err.to_string().contains("invalid request"), "{err}");
    assert!(service.calls().is_empty());

    let err = workbench.magic("do things").await.err().expect("no nodes fails");
    assert!(err.to_string().contains("no nodes"), "{err}");
    assert!(!service.calls().iter().any(|c| matches!(c, Call::Create(_))));
}

#[tokio::test]
async fn legacy_template_imports_as_new_flow() {
    let legacy = json!({"drawflow": {"Home": {"data": {
        "1": {"id": 1, "name": "manual_trigger", "class": "manual_trigger", "data": {},
              "inputs": {}, "outputs": {"output_1": {"connections": [{"node": "2", "output": "input_1"}]}},
              "pos_x": 50, "pos_y": 100},
        "2": {"id": 2, "name": "ai_prompt", "class": "ai_prompt", "data": {"prompt": "Summarize"},
              "inputs": {"input_1": {"connections": [{"node": "1", "input": "output_1"}]}},
              "outputs": {"output_1": {"connections": []}}, "pos_x": 300, "pos_y": 100}
    }}}});
    let template = Template {
        id: Some(TemplateId::new("daily_news")),
        name: "📰 Daily News".to_string(),
        description: "Morning headlines".to_string(),
        category: Some("Content".to_string()),
        flow_data: Some(json!(legacy.to_string())),
        error: None,
    };
    let service = Arc::new(RecordingService::new().with_template("daily_news", template));
    let mut workbench = workbench(&service);

    let session = workbench
        .import_template(&TemplateId::new("daily_news"))
        .await
        .expect("import");
    assert_eq!(session.name(), "Daily News");

    let stored = service.stored(session.flow_id()).expect("stored");
    let graph: GraphModel = stored.graph().expect("graph model");
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edges().len(), 1);
    assert_eq!(
        graph.node("ai_prompt").and_then(|n| n.config_str("prompt")),
        Some("Summarize")
    );
}

#[tokio::test]
async fn unknown_template_is_malformed() {
    let service = Arc::new(RecordingService::new());
    let mut workbench = workbench(&service);

    let err = workbench
        .import_template(&TemplateId::new("nope"))
        .await
        .err()
        .expect("unknown template fails");
    assert!(err.to_string().contains("Template not found"), "{err}");
    assert!(!service.calls().iter().any(|c| matches!(c, Call::Create(_))));
}

#[tokio::test]
async fn catalog_failure_yields_empty_catalog_and_retries() {
    let service = Arc::new(RecordingService::new().failing_blocks(1));
    let mut workbench = workbench(&service);

    assert!(workbench.blocks().await.is_empty());
    assert!(!workbench.blocks().await.is_empty());
    assert!(!workbench.blocks().await.is_empty());

    let fetches = service.calls().iter().filter(|c| **c == Call::Blocks).count();
    assert_eq!(fetches, 2);

    assert!(!workbench.reload_blocks().await.is_empty());
    let fetches = service.calls().iter().filter(|c| **c == Call::Blocks).count();
    assert_eq!(fetches, 3);
}

#[tokio::test]
async fn opening_with_empty_catalog_skips_every_node() {
    let service = Arc::new(RecordingService::new().failing_blocks(usize::MAX));
    let mut workbench = workbench(&service);

    let mut session = workbench.create_empty("Offline", "").await.expect("create");
    assert!(session.add_block("output", None).is_none());
}
