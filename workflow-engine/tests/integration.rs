use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::tempdir;

use workflow_engine::{ActionDispatch, ActionResult, ActorNode, ActorPayload, ActorSystem, Interpreter};

struct Counter;

#[async_trait]
impl ActionDispatch for Counter {
    async fn dispatch(&self, action_name: &str, args: &str) -> ActionResult {
        match action_name {
            "increment" => {
                let n: i64 = args
                    .trim_start_matches('[')
                    .trim_end_matches(']')
                    .trim_matches('"')
                    .parse()
                    .unwrap_or(0);
                ActionResult::success((n + 1).to_string())
            }
            _ => ActionResult::failure(format!("unsupported action {action_name}")),
        }
    }
}

fn system_with_counters(names: &[&str]) -> Arc<ActorSystem> {
    let sys = ActorSystem::new();
    for name in names {
        sys.add_actor(ActorNode::new(*name, ActorPayload::Plain(Arc::new(Counter))));
    }
    Arc::new(sys)
}

#[tokio::test]
async fn full_run_of_composed_overlay_workflow() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("manifest.yaml"),
        "bases:\n  - main.yaml\npatches:\n  - patch.yaml\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("main.yaml"),
        "name: main\ntransitions:\n  - label: step\n    states: [\"0\", \"end\"]\n    actions:\n      - actor: counter\n        method: increment\n        arguments: \"1\"\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("patch.yaml"),
        "steps:\n  - label: step\n    states: [\"0\", \"end\"]\n    actions:\n      - actor: counter\n        method: increment\n        arguments: \"41\"\n",
    )
    .unwrap();

    let sys = system_with_counters(&["counter"]);
    let mut interp = Interpreter::new(sys);
    interp.load_with_overlay("main.yaml", dir.path()).unwrap();

    let result = interp.run_until_end(10).await.unwrap();
    assert!(result.success);
    assert_eq!(result.payload, "42");
}

#[tokio::test]
async fn sub_workflow_call_cleans_up_child_actor() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("child.yaml"),
        "name: child\ntransitions:\n  - states: [\"0\", \"end\"]\n    actions:\n      - actor: counter\n        method: increment\n        arguments: \"9\"\n",
    )
    .unwrap();

    let sys = system_with_counters(&["counter"]);
    let before = sys.actor_count();
    let mut interp = Interpreter::new(sys.clone());
    interp.set_workflow_base_dir(dir.path());

    let result = interp.call("child.yaml").await.unwrap();
    assert!(result.success);
    assert_eq!(result.payload, "10");
    assert_eq!(sys.actor_count(), before, "child actor must be torn down after the call returns");
}

#[tokio::test]
async fn xml_and_json_workflows_produce_equivalent_results() {
    let sys = system_with_counters(&["counter"]);

    let yaml = "name: wf\ntransitions:\n  - states: [\"0\", \"end\"]\n    actions:\n      - actor: counter\n        method: increment\n        arguments: \"4\"\n";
    let json = r#"{"name":"wf","transitions":[{"states":["0","end"],"actions":[{"actor":"counter","method":"increment","arguments":"4"}]}]}"#;
    let xml = r#"<workflow name="wf"><steps><transition from="0" to="end"><action actor="counter" method="increment"><arguments>4</arguments></action></transition></steps></workflow>"#;

    let mut via_yaml = Interpreter::new(sys.clone());
    via_yaml.load_yaml(yaml).unwrap();
    let yaml_result = via_yaml.run_until_end(10).await.unwrap();

    let mut via_json = Interpreter::new(sys.clone());
    via_json.load_json(json).unwrap();
    let json_result = via_json.run_until_end(10).await.unwrap();

    let mut via_xml = Interpreter::new(sys);
    via_xml.load_xml(xml).unwrap();
    let xml_result = via_xml.run_until_end(10).await.unwrap();

    assert_eq!(yaml_result.payload, "5");
    assert_eq!(yaml_result.payload, json_result.payload);
    assert_eq!(yaml_result.payload, xml_result.payload);
}
